use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// A converted lead with KYC and investment tracking.
pub struct Customer {
    pub id: i64,
    pub lead_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub pan_number: Option<String>,
    /// pending, verified, rejected
    pub kyc_status: String,
    pub demat_account: Option<String>,
    pub total_investment: Option<f64>,
    pub relationship_manager: Option<i64>,
    /// active, inactive, suspended
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    #[serde(default)]
    pub lead_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub pan_number: Option<String>,
    #[serde(default)]
    pub demat_account: Option<String>,
    #[serde(default)]
    pub relationship_manager: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub pan_number: Option<String>,
    pub kyc_status: Option<String>,
    pub demat_account: Option<String>,
    pub total_investment: Option<f64>,
    pub relationship_manager: Option<i64>,
    pub status: Option<String>,
}
