pub mod dashboard;
pub mod home;
pub mod login;
pub mod session_analytics;
