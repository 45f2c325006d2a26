pub mod activity_logs;
pub mod login_logs;
pub mod otps;
pub mod page_views;
pub mod sessions;
pub mod users;
