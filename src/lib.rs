pub mod app;
pub mod backend;
pub mod config;
pub mod models;
pub mod store;

// Always available for integration tests but marked as test-only
#[cfg(any(test, debug_assertions, feature = "test-utils"))]
pub mod test_utils;

pub use app::App;
pub use config::AppConfig;
pub use store::Store;
