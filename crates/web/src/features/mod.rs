pub mod activities;
pub mod admin;
pub mod auth;
pub mod certificates;
pub mod enrollments;
pub mod history;
pub mod messages;
pub mod notifications;
pub mod users;
