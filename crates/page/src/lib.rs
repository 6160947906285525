//! Frequencia attendance desk
//!
//! The page controller and everything it drives:
//! - `view`: the page's controls as plain data
//! - `notify`: timed success and error banners
//! - `controller`: page actions against the attendance backend
//! - `render`: full page markup
//! - `host`: the axum router binding forms to controller actions

pub mod controller;
pub mod host;
pub mod notify;
pub mod render;
pub mod view;

pub use controller::{ControllerOptions, PageController};
pub use host::{create_router, AppState};
