pub mod app_error;
pub mod cache_store;
pub mod config;
pub mod db;
pub mod grant;
pub mod hashing;
pub mod launch;
pub mod mirror;
pub mod session;
pub mod transfer;
pub mod types;

pub use app_error::AppError;
