use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::log_activity,
    models::{
        support_ticket::{CreateSupportTicket, SupportTicket},
        user::{User, UserRole},
    },
};

const TICKET_COLUMNS: &str = "id, ticket_number, customer_id, subject, description, category, \
     priority, status, assigned_to, resolution, resolved_at, created_at, updated_at";

pub async fn list_tickets(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<SupportTicket>>, AppError> {
    let tickets = if user.has_role(&[UserRole::Admin, UserRole::Support]) {
        sqlx::query_as::<_, SupportTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets ORDER BY created_at DESC"
        ))
        .fetch_all(&pool)
        .await?
    } else {
        sqlx::query_as::<_, SupportTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets WHERE assigned_to = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(user.id)
        .fetch_all(&pool)
        .await?
    };

    Ok(Json(tickets))
}

pub async fn create_ticket(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(payload): Json<CreateSupportTicket>,
) -> Result<Json<SupportTicket>, AppError> {
    payload.validate()?;

    let ticket_number = generate_ticket_number();
    let priority = payload.priority.as_deref().unwrap_or("medium");

    let ticket = sqlx::query_as::<_, SupportTicket>(&format!(
        "INSERT INTO support_tickets (ticket_number, customer_id, subject, description, \
         category, priority, status, assigned_to) \
         VALUES ($1, $2, $3, $4, $5, $6, 'open', $7) \
         RETURNING {TICKET_COLUMNS}"
    ))
    .bind(&ticket_number)
    .bind(payload.customer_id)
    .bind(&payload.subject)
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(priority)
    .bind(payload.assigned_to)
    .fetch_one(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "ticket",
        ticket.id,
        "create",
        json!({"ticketNumber": ticket.ticket_number}),
        &headers,
    )
    .await;

    Ok(Json(ticket))
}

fn generate_ticket_number() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("TKT-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_numbers_have_expected_shape() {
        let number = generate_ticket_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TKT");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
