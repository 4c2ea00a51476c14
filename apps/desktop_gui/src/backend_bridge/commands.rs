//! Backend commands queued from UI to backend worker.

use shared::{domain::KoderId, validation::Field};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Load,
    UpdateField { field: Field, value: String },
    Submit,
    Delete { koder_id: KoderId },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Load => "load",
            BackendCommand::UpdateField { .. } => "update_field",
            BackendCommand::Submit => "submit",
            BackendCommand::Delete { .. } => "delete",
        }
    }
}
