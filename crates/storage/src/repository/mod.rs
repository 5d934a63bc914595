pub mod activity;
pub mod audit_log;
pub mod certificate;
pub mod enrollment;
pub mod history;
pub mod message;
pub mod notification;
pub mod password_reset;
pub mod user;
