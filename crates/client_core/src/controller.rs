//! Form & list controller.
//!
//! Owns the cached koder list and the form, and sequences store calls:
//! create or delete first, then a wholesale refetch through the cache's single
//! invalidation rule. Store failures never escape; they become notifications
//! and typed outcomes. The state lock is never held across a store call, so
//! overlapping actions proceed concurrently.

use std::{fmt, sync::Arc};

use shared::{
    domain::{Koder, KoderId},
    validation::{Field, FieldError},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    cache::{RecordCache, ResyncApplied, ResyncTicket},
    error::TransportError,
    form::{FormSnapshot, KoderForm, SubmitPolicy},
    store::RecordStore,
    view::{KodersView, ListView},
};

const EVENT_CAPACITY: usize = 256;

/// User action a notification belongs to. Refetches after a mutation report
/// under `Load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Create,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub operation: Operation,
    pub message: String,
}

impl Notification {
    /// Loads finish silently; only mutations announce success.
    fn success(operation: Operation, message: &str) -> Self {
        Self {
            level: NotificationLevel::Success,
            operation,
            message: message.to_string(),
        }
    }

    fn failure(operation: Operation, err: &TransportError) -> Self {
        let prefix = match operation {
            Operation::Load => "Could not load koders",
            Operation::Create => "Could not create koder",
            Operation::Delete => "Could not delete koder",
        };
        Self {
            level: NotificationLevel::Error,
            operation,
            message: format!("{prefix}: {err}"),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    RecordsReplaced(Vec<Koder>),
    FormChanged(FormSnapshot),
    /// The form was cleared after a successful create; focus is on the first field.
    FormReset(FormSnapshot),
    Notification(Notification),
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded { count: usize },
    /// A newer resync already landed; this result was dropped.
    Superseded,
    Failed(TransportError),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Invalid(Vec<FieldError>),
    /// `refreshed` is false when the follow-up refetch failed or was superseded.
    Created { refreshed: bool },
    Failed(TransportError),
}

#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted { refreshed: bool },
    Failed(TransportError),
}

struct ControllerState {
    cache: RecordCache,
    form: KoderForm,
}

pub struct KodersController {
    store: Arc<dyn RecordStore>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ClientEvent>,
}

impl KodersController {
    pub fn new(store: Arc<dyn RecordStore>, policy: SubmitPolicy) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            store,
            inner: Mutex::new(ControllerState {
                cache: RecordCache::new(),
                form: KoderForm::new(policy),
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Initial population of the list. On failure the list stays empty.
    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.inner.lock().await.cache.begin_resync();
        match self.resync(ticket).await {
            Ok(ResyncApplied::Applied) => LoadOutcome::Loaded {
                count: self.inner.lock().await.cache.records().len(),
            },
            Ok(ResyncApplied::Discarded) => LoadOutcome::Superseded,
            Err(err) => LoadOutcome::Failed(err),
        }
    }

    pub async fn update_field(&self, field: Field, value: impl Into<String>) -> FormSnapshot {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.form.set_field(field, value);
            inner.form.snapshot()
        };
        self.emit(ClientEvent::FormChanged(snapshot.clone()));
        snapshot
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (new_koder, snapshot) = {
            let mut inner = self.inner.lock().await;
            inner.form.mark_submitted();
            let valid = inner.form.validate_all();
            let snapshot = inner.form.snapshot();
            if !valid {
                let errors = inner.form.errors();
                drop(inner);
                debug!(failing = errors.len(), "submit blocked by validation");
                self.emit(ClientEvent::FormChanged(snapshot));
                return SubmitOutcome::Invalid(errors);
            }
            (inner.form.to_new_koder(), snapshot)
        };
        self.emit(ClientEvent::FormChanged(snapshot));

        if let Err(err) = self.store.create_record(&new_koder).await {
            warn!(error = %err, "create failed; form kept as entered");
            self.notify(Notification::failure(Operation::Create, &err));
            return SubmitOutcome::Failed(err);
        }

        let refreshed = self.mutation_succeeded().await;

        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.form.reset();
            inner.form.snapshot()
        };
        self.emit(ClientEvent::FormReset(snapshot));
        info!(email = %new_koder.email, refreshed, "koder created");
        self.notify(Notification::success(Operation::Create, "Koder created successfully"));
        SubmitOutcome::Created { refreshed }
    }

    pub async fn delete(&self, koder_id: &KoderId) -> DeleteOutcome {
        if let Err(err) = self.store.delete_record(koder_id).await {
            warn!(%koder_id, error = %err, "delete failed; list left unchanged");
            self.notify(Notification::failure(Operation::Delete, &err));
            return DeleteOutcome::Failed(err);
        }

        let refreshed = self.mutation_succeeded().await;
        info!(%koder_id, refreshed, "koder deleted");
        self.notify(Notification::success(Operation::Delete, "Koder deleted successfully"));
        DeleteOutcome::Deleted { refreshed }
    }

    pub async fn records(&self) -> Vec<Koder> {
        self.inner.lock().await.cache.records().to_vec()
    }

    pub async fn form(&self) -> FormSnapshot {
        self.inner.lock().await.form.snapshot()
    }

    pub async fn view(&self) -> KodersView {
        let inner = self.inner.lock().await;
        KodersView {
            form: inner.form.snapshot(),
            list: ListView::from_records(inner.cache.records()),
        }
    }

    /// The cache's invalidation rule: invalidate, then resync exactly once.
    async fn mutation_succeeded(&self) -> bool {
        let ticket = self.inner.lock().await.cache.invalidate();
        matches!(self.resync(ticket).await, Ok(ResyncApplied::Applied))
    }

    async fn resync(&self, ticket: ResyncTicket) -> Result<ResyncApplied, TransportError> {
        match self.store.list_records().await {
            Ok(records) => {
                let mut inner = self.inner.lock().await;
                let applied = inner.cache.apply(ticket, records);
                match applied {
                    ResyncApplied::Applied => {
                        let records = inner.cache.records().to_vec();
                        drop(inner);
                        debug!(ticket = ticket.sequence(), count = records.len(), "koder list replaced");
                        self.emit(ClientEvent::RecordsReplaced(records));
                    }
                    ResyncApplied::Discarded => {
                        debug!(
                            ticket = ticket.sequence(),
                            newest = inner.cache.last_applied(),
                            "discarding superseded koder list"
                        );
                    }
                }
                Ok(applied)
            }
            Err(err) => {
                warn!(ticket = ticket.sequence(), error = %err, "koder list refetch failed");
                self.notify(Notification::failure(Operation::Load, &err));
                Err(err)
            }
        }
    }

    fn notify(&self, notification: Notification) {
        self.emit(ClientEvent::Notification(notification));
    }

    fn emit(&self, event: ClientEvent) {
        // Sending with no subscribers is not an error.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
