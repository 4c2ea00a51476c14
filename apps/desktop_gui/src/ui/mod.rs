//! UI layer for desktop GUI: the single Koders List window.

pub mod app;

pub use app::KodersApp;
