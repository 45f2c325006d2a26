use axum::{
    extract::{Extension, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::{leads::require_role, log_activity},
    models::{
        rfq::{CreateRfq, Rfq},
        user::{User, UserRole},
    },
};

const RFQ_COLUMNS: &str = "id, rfq_number, customer_id, bond_type, bond_name, face_value, \
     quantity, bid_price, ask_price, status, nse_rfq_id, submitted_by, submitted_at, \
     executed_at, notes, created_at, updated_at";

pub async fn list_rfqs(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(_user): Extension<User>,
) -> Result<Json<Vec<Rfq>>, AppError> {
    let rfqs = sqlx::query_as::<_, Rfq>(&format!(
        "SELECT {RFQ_COLUMNS} FROM rfqs ORDER BY created_at DESC"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(rfqs))
}

pub async fn create_rfq(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(payload): Json<CreateRfq>,
) -> Result<Json<Rfq>, AppError> {
    require_role(&user, &[UserRole::Admin, UserRole::Sales, UserRole::Rm])?;
    payload.validate()?;

    let rfq_number = format!("RFQ-{}", Utc::now().timestamp_millis());
    let rfq = sqlx::query_as::<_, Rfq>(&format!(
        "INSERT INTO rfqs (rfq_number, customer_id, bond_type, bond_name, face_value, quantity, \
         bid_price, ask_price, status, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9) \
         RETURNING {RFQ_COLUMNS}"
    ))
    .bind(&rfq_number)
    .bind(payload.customer_id)
    .bind(&payload.bond_type)
    .bind(&payload.bond_name)
    .bind(payload.face_value)
    .bind(payload.quantity)
    .bind(payload.bid_price)
    .bind(payload.ask_price)
    .bind(&payload.notes)
    .fetch_one(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "rfq",
        rfq.id,
        "create",
        json!({"rfqNumber": rfq.rfq_number}),
        &headers,
    )
    .await;

    Ok(Json(rfq))
}

/// Marks an RFQ submitted to the exchange.
///
/// Exchange connectivity is out of scope: this fabricates an NSE reference
/// id instead of talking to a real venue.
pub async fn submit_rfq(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Rfq>, AppError> {
    require_role(&user, &[UserRole::Admin, UserRole::Sales, UserRole::Rm])?;

    let rfq = sqlx::query_as::<_, Rfq>(&format!(
        "SELECT {RFQ_COLUMNS} FROM rfqs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("RFQ not found".to_string()))?;

    if rfq.status != "pending" {
        return Err(AppError::BadRequest(format!(
            "RFQ is {} and cannot be submitted",
            rfq.status
        )));
    }

    let nse_rfq_id = format!("NSE-RFQ-{}", Utc::now().timestamp_millis());
    let rfq = sqlx::query_as::<_, Rfq>(&format!(
        "UPDATE rfqs SET status = 'submitted', nse_rfq_id = $1, submitted_by = $2, \
         submitted_at = $3, updated_at = $3 WHERE id = $4 \
         RETURNING {RFQ_COLUMNS}"
    ))
    .bind(&nse_rfq_id)
    .bind(user.id)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "rfq",
        rfq.id,
        "update",
        json!({"rfqNumber": rfq.rfq_number, "nseRfqId": nse_rfq_id, "action": "submitted"}),
        &headers,
    )
    .await;

    Ok(Json(rfq))
}
