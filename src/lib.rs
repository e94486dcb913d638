pub mod api;
pub mod config;
pub mod distance;
pub mod error;
pub mod geo;
pub mod models;
pub mod observability;
pub mod service;
pub mod state;
pub mod store;
