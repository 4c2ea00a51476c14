//! UI-side state and the transitions driven by backend events.

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use client_core::{FormSnapshot, KoderForm, KodersView, ListView, Notification, SubmitPolicy};
use shared::{domain::Koder, validation::Field};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub const TOAST_TTL: Duration = Duration::from_secs(4);
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

pub struct UiState {
    pub status: String,
    pub startup_error: Option<String>,
    pub records: Vec<Koder>,
    pub form: FormSnapshot,
    /// Text buffers owned by the input widgets. Backend snapshots only
    /// overwrite them on reset so in-flight keystrokes are never lost.
    pub inputs: BTreeMap<Field, String>,
    pub toasts: Vec<Toast>,
    pub focus_request: Option<Field>,
}

impl UiState {
    pub fn new(policy: SubmitPolicy) -> Self {
        Self {
            status: String::new(),
            startup_error: None,
            records: Vec::new(),
            form: KoderForm::new(policy).snapshot(),
            inputs: Field::ALL
                .into_iter()
                .map(|field| (field, String::new()))
                .collect(),
            toasts: Vec::new(),
            focus_request: Some(Field::FirstName),
        }
    }

    pub fn apply(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::Info(message) => self.status = message,
            UiEvent::Error(message) => {
                self.status = message.clone();
                self.startup_error = Some(message);
            }
            UiEvent::RecordsReplaced(records) => self.records = records,
            UiEvent::FormChanged(snapshot) => self.form = snapshot,
            UiEvent::FormReset(snapshot) => {
                for field in Field::ALL {
                    self.inputs
                        .insert(field, snapshot.value(field).to_string());
                }
                self.focus_request = snapshot.focus;
                self.form = snapshot;
            }
            UiEvent::Notification(notification) => {
                self.toasts.push(Toast {
                    notification,
                    shown_at: now,
                });
                if self.toasts.len() > MAX_TOASTS {
                    let excess = self.toasts.len() - MAX_TOASTS;
                    self.toasts.drain(..excess);
                }
            }
        }
    }

    pub fn edit_field(&mut self, field: Field, value: String) -> BackendCommand {
        self.inputs.insert(field, value.clone());
        BackendCommand::UpdateField { field, value }
    }

    pub fn input(&self, field: Field) -> &str {
        self.inputs.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < TOAST_TTL);
    }

    pub fn view(&self) -> KodersView {
        KodersView {
            form: self.form.clone(),
            list: ListView::from_records(&self.records),
        }
    }
}
