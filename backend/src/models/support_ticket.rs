use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// A customer support ticket.
pub struct SupportTicket {
    pub id: i64,
    pub ticket_number: String,
    pub customer_id: Option<i64>,
    pub subject: String,
    pub description: String,
    /// technical, trading, kyc, general
    pub category: String,
    /// low, medium, high, urgent
    pub priority: String,
    /// open, in_progress, resolved, closed
    pub status: String,
    pub assigned_to: Option<i64>,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupportTicket {
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[validate(length(min = 1, max = 300))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
}
