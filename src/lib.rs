pub mod artwork;
pub mod batch;
pub mod compare;
pub mod config;
pub mod coverage;
pub mod discovery;
pub mod errors;
pub mod generator;
pub mod mapping;
pub mod models;
pub mod observability;
pub mod reconcile;
pub mod sources;
pub mod utils;
