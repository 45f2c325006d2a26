//! Common validation rules shared across request payloads.

use validator::ValidationError;

const LEAD_SOURCES: [&str; 5] = [
    "website",
    "referral",
    "social_media",
    "email_campaign",
    "direct",
];

const LEAD_STATUSES: [&str; 5] = ["new", "contacted", "qualified", "converted", "lost"];

/// Validates a lead acquisition source against the known channel list.
pub fn validate_lead_source(source: &str) -> Result<(), ValidationError> {
    if LEAD_SOURCES.contains(&source) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_lead_source"))
    }
}

/// Validates a lead pipeline status.
pub fn validate_lead_status(status: &str) -> Result<(), ValidationError> {
    if LEAD_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_lead_status"))
    }
}
