pub mod repositories;
mod schema;

pub use schema::run_migrations;
