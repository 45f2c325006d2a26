pub mod activity_log;
pub mod customer;
pub mod email_template;
pub mod lead;
pub mod login_log;
pub mod otp;
pub mod page_view;
pub mod rfq;
pub mod session;
pub mod support_ticket;
pub mod user;
