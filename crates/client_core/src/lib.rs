//! Client core for the Koders List: the record store client, form validation
//! state, the cached list and the controller that sequences them.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod store;
pub mod view;

pub use cache::{RecordCache, ResyncApplied, ResyncTicket};
pub use config::{load_client_settings, ClientSettings};
pub use controller::{
    ClientEvent, DeleteOutcome, KodersController, LoadOutcome, Notification, NotificationLevel,
    Operation, SubmitOutcome,
};
pub use error::{StoreOperation, TransportError};
pub use form::{FormSnapshot, KoderForm, SubmitPolicy};
pub use store::{HttpRecordStore, RecordStore};
pub use view::{KodersView, ListView, RecordRow};
