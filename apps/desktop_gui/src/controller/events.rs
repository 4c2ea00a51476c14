//! Events delivered from the backend worker to the UI thread.

use client_core::{FormSnapshot, Notification};
use shared::domain::Koder;

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    /// Backend worker could not start; nothing else will arrive.
    Error(String),
    RecordsReplaced(Vec<Koder>),
    FormChanged(FormSnapshot),
    FormReset(FormSnapshot),
    Notification(Notification),
}
