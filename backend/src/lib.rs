use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod utils;
pub mod validation;

use config::Config;
use db::connection::DbPool;

pub fn build_router(pool: DbPool, config: Config) -> Router {
    // OTP endpoints are the unauthenticated brute-force surface; they get
    // their own peer-IP rate limit on top of the shared layers.
    let otp_routes = Router::new()
        .route("/api/auth/request-otp", post(handlers::auth::request_otp))
        .route("/api/auth/verify-otp", post(handlers::auth::verify_otp))
        .layer(middleware::rate_limit::create_otp_rate_limiter(&config));

    // Termination reports resolve their credential manually (header or body)
    // so the beacon transport and expired tokens still reach them.
    let termination_routes = Router::new()
        .route("/api/auth/session-end", post(handlers::auth::session_end))
        .route(
            "/api/page-tracking/end",
            post(handlers::tracking::end_page_view),
        );

    // Build user-protected routes (auth required)
    let user_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/page-tracking/start",
            post(handlers::tracking::start_page_view),
        )
        .route(
            "/api/leads",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route(
            "/api/leads/{id}",
            put(handlers::leads::update_lead).delete(handlers::leads::delete_lead),
        )
        .route(
            "/api/leads/{id}/follow-ups",
            get(handlers::leads::list_follow_ups).post(handlers::leads::create_follow_up),
        )
        .route(
            "/api/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/api/customers/{id}",
            put(handlers::customers::update_customer),
        )
        .route(
            "/api/rfqs",
            get(handlers::rfqs::list_rfqs).post(handlers::rfqs::create_rfq),
        )
        .route("/api/rfqs/{id}/submit", post(handlers::rfqs::submit_rfq))
        .route(
            "/api/support-tickets",
            get(handlers::tickets::list_tickets).post(handlers::tickets::create_ticket),
        )
        .route(
            "/api/email-templates",
            get(handlers::templates::list_templates).post(handlers::templates::create_template),
        )
        .route("/api/dashboard/kpis", get(handlers::dashboard::get_kpis))
        .route(
            "/api/dashboard/lead-sources",
            get(handlers::dashboard::get_lead_sources),
        )
        .route(
            "/api/dashboard/recent-activities",
            get(handlers::dashboard::get_recent_activities),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            middleware::auth,
        ));

    // Build admin-protected routes (auth + admin role)
    let admin_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::admin::get_users).post(handlers::admin::create_user),
        )
        .route("/api/users/{id}", put(handlers::admin::update_user))
        .route(
            "/api/session-analytics",
            get(handlers::tracking::session_analytics),
        )
        .route("/api/login-logs", get(handlers::admin::get_login_logs))
        .route(
            "/api/activity-logs",
            get(handlers::admin::get_activity_logs),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            middleware::auth_admin,
        ));

    // Compose app with shared layers (CORS/Trace/request-id) and shared state
    Router::new()
        .merge(otp_routes)
        .merge(termination_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(
                    middleware::request_id::request_id,
                ))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state((pool, config))
}
