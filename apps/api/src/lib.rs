pub mod ai;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod inference;
pub mod models;
pub mod notes;
pub mod routes;
pub mod state;
