pub mod app_state;
pub mod auth;
pub mod config;
pub mod database;
pub mod services;
