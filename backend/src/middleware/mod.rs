pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{auth, auth_admin};
