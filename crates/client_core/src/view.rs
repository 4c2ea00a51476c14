use std::fmt;

use shared::domain::{Koder, KoderId};

use crate::form::FormSnapshot;

pub const APP_TITLE: &str = "Koders List";
pub const EMPTY_LIST_PLACEHOLDER: &str = "No records";
pub const ALL_VALID_STATUS: &str = "Everything is ok";
pub const SUBMIT_LABEL: &str = "Add";

/// One list row. The delete control is bound to `id`, never to the row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: KoderId,
    pub display_name: String,
    pub email: String,
}

impl From<&Koder> for RecordRow {
    fn from(koder: &Koder) -> Self {
        Self {
            id: koder.id.clone(),
            display_name: koder.display_name(),
            email: koder.email.clone(),
        }
    }
}

impl fmt::Display for RecordRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.id, self.display_name, self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Placeholder(&'static str),
    Rows(Vec<RecordRow>),
}

impl ListView {
    pub fn from_records(records: &[Koder]) -> Self {
        if records.is_empty() {
            Self::Placeholder(EMPTY_LIST_PLACEHOLDER)
        } else {
            Self::Rows(records.iter().map(RecordRow::from).collect())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KodersView {
    pub form: FormSnapshot,
    pub list: ListView,
}

impl KodersView {
    pub fn status_line(&self) -> Option<&'static str> {
        self.form.all_valid.then_some(ALL_VALID_STATUS)
    }
}
