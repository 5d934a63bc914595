pub mod activity;
pub mod audit;
pub mod auth;
pub mod certificate;
pub mod enrollment;
pub mod history;
pub mod message;
pub mod notification;
pub mod user;
