use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::{config::Config, error::AppError, models::user::User};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub total_leads: i64,
    pub active_customers: i64,
    pub pending_rfqs: i64,
    pub open_tickets: i64,
}

pub async fn get_kpis(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(_user): Extension<User>,
) -> Result<Json<DashboardKpis>, AppError> {
    let total_leads = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
        .fetch_one(&pool)
        .await?;
    let active_customers =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE status = 'active'")
            .fetch_one(&pool)
            .await?;
    let pending_rfqs =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rfqs WHERE status = 'pending'")
            .fetch_one(&pool)
            .await?;
    let open_tickets = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM support_tickets WHERE status IN ('open', 'in_progress')",
    )
    .fetch_one(&pool)
    .await?;

    Ok(Json(DashboardKpis {
        total_leads,
        active_customers,
        pending_rfqs,
        open_tickets,
    }))
}

#[derive(Debug, Serialize, FromRow)]
pub struct LeadSourceCount {
    pub source: String,
    pub count: i64,
}

pub async fn get_lead_sources(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(_user): Extension<User>,
) -> Result<Json<Vec<LeadSourceCount>>, AppError> {
    let sources = sqlx::query_as::<_, LeadSourceCount>(
        "SELECT source, COUNT(*) AS count FROM leads GROUP BY source ORDER BY count DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(sources))
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

pub async fn get_recent_activities(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(_user): Extension<User>,
) -> Result<Json<Vec<RecentActivity>>, AppError> {
    let activities = sqlx::query_as::<_, RecentActivity>(
        "SELECT a.id, a.user_id, u.name AS user_name, a.entity_type, a.entity_id, a.action, \
         a.created_at \
         FROM activity_logs a LEFT JOIN users u ON u.id = a.user_id \
         ORDER BY a.created_at DESC, a.id DESC LIMIT 10",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(activities))
}
