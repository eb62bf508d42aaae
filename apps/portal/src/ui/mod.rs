//! UI layer: app shell, navigation chrome, text views, themes, and strings.

pub mod app;
pub mod i18n;
pub mod shell;
pub mod theme;
pub mod views;
