//src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod models;
pub mod seed;
pub mod services;

pub use common::error::{AppError, FieldErrors};
pub use config::{AppConfig, AppState};
