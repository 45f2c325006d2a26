use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// A request-for-quote against the exchange.
///
/// Exchange connectivity is out of scope; submission fabricates a
/// reference id rather than talking to the NSE.
pub struct Rfq {
    pub id: i64,
    pub rfq_number: String,
    pub customer_id: Option<i64>,
    /// government, corporate, municipal
    pub bond_type: String,
    pub bond_name: String,
    pub face_value: f64,
    pub quantity: i32,
    pub bid_price: Option<f64>,
    pub ask_price: Option<f64>,
    /// pending, submitted, executed, cancelled
    pub status: String,
    pub nse_rfq_id: Option<String>,
    pub submitted_by: Option<i64>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRfq {
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[validate(length(min = 1, max = 50))]
    pub bond_type: String,
    #[validate(length(min = 1, max = 200))]
    pub bond_name: String,
    #[validate(range(min = 0.0))]
    pub face_value: f64,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    pub bid_price: Option<f64>,
    #[serde(default)]
    pub ask_price: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}
