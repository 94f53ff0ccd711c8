/// HTTP route handlers

pub mod auth;
pub mod health;
pub mod me;
pub mod projects;
pub mod tasks;
pub mod users;
