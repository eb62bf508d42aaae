//! MetaLearn portal: screen controllers, backend bridge, and text views.

pub mod backend_bridge;
pub mod config;
pub mod controller;
pub mod ui;

pub use config::{load_settings, Settings};
pub use ui::app::{Flow, PortalApp};
