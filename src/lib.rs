pub mod aggregate;
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod state;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use state::AppState;
