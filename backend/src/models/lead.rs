use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// A prospective bond investor captured from a marketing channel.
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// website, referral, social_media, email_campaign, direct
    pub source: String,
    /// new, contacted, qualified, converted, lost
    pub status: String,
    pub assigned_to: Option<i64>,
    pub notes: Option<String>,
    pub investment_amount: Option<f64>,
    /// government, corporate, municipal
    pub bond_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLead {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[validate(custom(function = "rules::validate_lead_source"))]
    pub source: String,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub investment_amount: Option<f64>,
    #[serde(default)]
    pub bond_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLead {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    #[validate(custom(function = "rules::validate_lead_status"))]
    pub status: Option<String>,
    pub assigned_to: Option<i64>,
    pub notes: Option<String>,
    pub investment_amount: Option<f64>,
    pub bond_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// Follow-up note attached to a lead.
pub struct LeadFollowUp {
    pub id: i64,
    pub lead_id: i64,
    pub note: String,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadFollowUp {
    #[validate(length(min = 1, max = 2000))]
    pub note: String,
    #[serde(default)]
    pub follow_up_date: Option<DateTime<Utc>>,
}
