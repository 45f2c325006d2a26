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
    handlers::log_activity,
    models::{
        lead::{CreateLead, CreateLeadFollowUp, Lead, LeadFollowUp, UpdateLead},
        user::{User, UserRole},
    },
};

const LEAD_COLUMNS: &str = "id, name, email, phone, company, source, status, assigned_to, \
     notes, investment_amount, bond_type, created_at, updated_at";

pub async fn list_leads(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Lead>>, AppError> {
    let leads = if user.is_admin() {
        sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC"
        ))
        .fetch_all(&pool)
        .await?
    } else {
        sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE assigned_to = $1 ORDER BY created_at DESC"
        ))
        .bind(user.id)
        .fetch_all(&pool)
        .await?
    };

    Ok(Json(leads))
}

pub async fn create_lead(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(payload): Json<CreateLead>,
) -> Result<Json<Lead>, AppError> {
    require_role(&user, &[UserRole::Admin, UserRole::Sales])?;
    payload.validate()?;

    let lead = sqlx::query_as::<_, Lead>(&format!(
        "INSERT INTO leads (name, email, phone, company, source, status, assigned_to, notes, \
         investment_amount, bond_type) \
         VALUES ($1, $2, $3, $4, $5, 'new', $6, $7, $8, $9) \
         RETURNING {LEAD_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.company)
    .bind(&payload.source)
    .bind(payload.assigned_to)
    .bind(&payload.notes)
    .bind(payload.investment_amount)
    .bind(&payload.bond_type)
    .fetch_one(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "lead",
        lead.id,
        "create",
        json!({"leadName": lead.name}),
        &headers,
    )
    .await;

    Ok(Json(lead))
}

pub async fn update_lead(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateLead>,
) -> Result<Json<Lead>, AppError> {
    require_role(&user, &[UserRole::Admin, UserRole::Sales])?;
    payload.validate()?;

    let mut lead = sqlx::query_as::<_, Lead>(&format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    if let Some(name) = payload.name {
        lead.name = name;
    }
    if let Some(email) = payload.email {
        lead.email = email;
    }
    if let Some(phone) = payload.phone {
        lead.phone = Some(phone);
    }
    if let Some(company) = payload.company {
        lead.company = Some(company);
    }
    if let Some(source) = payload.source {
        lead.source = source;
    }
    if let Some(status) = payload.status {
        lead.status = status;
    }
    if let Some(assigned_to) = payload.assigned_to {
        lead.assigned_to = Some(assigned_to);
    }
    if let Some(notes) = payload.notes {
        lead.notes = Some(notes);
    }
    if let Some(amount) = payload.investment_amount {
        lead.investment_amount = Some(amount);
    }
    if let Some(bond_type) = payload.bond_type {
        lead.bond_type = Some(bond_type);
    }
    lead.updated_at = Utc::now();

    sqlx::query(
        "UPDATE leads SET name = $1, email = $2, phone = $3, company = $4, source = $5, \
         status = $6, assigned_to = $7, notes = $8, investment_amount = $9, bond_type = $10, \
         updated_at = $11 WHERE id = $12",
    )
    .bind(&lead.name)
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.company)
    .bind(&lead.source)
    .bind(&lead.status)
    .bind(lead.assigned_to)
    .bind(&lead.notes)
    .bind(lead.investment_amount)
    .bind(&lead.bond_type)
    .bind(lead.updated_at)
    .bind(lead.id)
    .execute(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "lead",
        lead.id,
        "update",
        json!({"leadName": lead.name}),
        &headers,
    )
    .await;

    Ok(Json(lead))
}

pub async fn delete_lead(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    require_role(&user, &[UserRole::Admin])?;

    let result = sqlx::query("DELETE FROM leads WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Lead not found".to_string()));
    }

    log_activity(&pool, &user, "lead", id, "delete", json!({}), &headers).await;

    Ok(Json(json!({"message": "Lead deleted successfully"})))
}

pub async fn list_follow_ups(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(_user): Extension<User>,
    Path(lead_id): Path<i64>,
) -> Result<Json<Vec<LeadFollowUp>>, AppError> {
    let follow_ups = sqlx::query_as::<_, LeadFollowUp>(
        "SELECT id, lead_id, note, follow_up_date, created_by, created_at \
         FROM lead_follow_ups WHERE lead_id = $1 ORDER BY created_at DESC",
    )
    .bind(lead_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(follow_ups))
}

pub async fn create_follow_up(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(lead_id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<CreateLeadFollowUp>,
) -> Result<Json<LeadFollowUp>, AppError> {
    payload.validate()?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads WHERE id = $1")
        .bind(lead_id)
        .fetch_one(&pool)
        .await?;
    if exists == 0 {
        return Err(AppError::NotFound("Lead not found".to_string()));
    }

    let follow_up = sqlx::query_as::<_, LeadFollowUp>(
        "INSERT INTO lead_follow_ups (lead_id, note, follow_up_date, created_by) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, lead_id, note, follow_up_date, created_by, created_at",
    )
    .bind(lead_id)
    .bind(&payload.note)
    .bind(payload.follow_up_date)
    .bind(user.id)
    .fetch_one(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "lead",
        lead_id,
        "update",
        json!({"action": "follow_up_added", "note": follow_up.note}),
        &headers,
    )
    .await;

    Ok(Json(follow_up))
}

pub(crate) fn require_role(user: &User, allowed: &[UserRole]) -> Result<(), AppError> {
    if user.has_role(allowed) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Insufficient permissions".to_string()))
    }
}
