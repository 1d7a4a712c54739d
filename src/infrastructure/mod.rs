pub mod auth;
pub mod catalog;
pub mod database;
pub mod repositories;
