pub mod app;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod state;

pub use app::build_router;
