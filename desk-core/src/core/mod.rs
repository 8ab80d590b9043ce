//! Application Core

pub mod config;
pub mod context;

pub use config::Config;
pub use context::AppContext;

/// Load `.env` and initialize logging. Call once at startup.
pub fn setup_environment() {
    dotenv::dotenv().ok();
    crate::utils::logger::init_logger();
}
