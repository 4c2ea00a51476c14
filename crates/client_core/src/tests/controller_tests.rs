use super::*;
use std::collections::VecDeque;

use async_trait::async_trait;
use shared::domain::NewKoder;
use tokio::sync::{mpsc, oneshot};

use crate::error::StoreOperation;

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreCall {
    List,
    Create(NewKoder),
    Delete(KoderId),
}

/// In-memory stand-in for the remote store that records every call.
#[derive(Default)]
struct FakeRecordStore {
    remote: Mutex<Vec<Koder>>,
    next_id: Mutex<u64>,
    calls: Mutex<Vec<StoreCall>>,
    fail_list: Mutex<bool>,
    fail_create: Mutex<bool>,
    fail_delete: Mutex<bool>,
    list_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    list_entered: Mutex<Option<mpsc::UnboundedSender<()>>>,
}

impl FakeRecordStore {
    fn with_records(records: Vec<Koder>) -> Arc<Self> {
        let store = Self::default();
        *store.remote.try_lock().expect("fresh lock") = records;
        Arc::new(store)
    }

    async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    async fn list_calls(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| **call == StoreCall::List)
            .count()
    }

    fn failure(operation: StoreOperation) -> TransportError {
        TransportError::new(operation, "connection refused")
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn list_records(&self) -> Result<Vec<Koder>, TransportError> {
        self.calls.lock().await.push(StoreCall::List);
        let snapshot = self.remote.lock().await.clone();
        if let Some(entered) = self.list_entered.lock().await.as_ref() {
            let _ = entered.send(());
        }
        let gate = self.list_gates.lock().await.pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if *self.fail_list.lock().await {
            return Err(Self::failure(StoreOperation::ListRecords));
        }
        Ok(snapshot)
    }

    async fn create_record(&self, koder: &NewKoder) -> Result<(), TransportError> {
        self.calls.lock().await.push(StoreCall::Create(koder.clone()));
        if *self.fail_create.lock().await {
            return Err(Self::failure(StoreOperation::CreateRecord));
        }
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let id = KoderId::new(format!("srv-{next_id}"));
        self.remote.lock().await.push(koder.clone().with_id(id));
        Ok(())
    }

    async fn delete_record(&self, koder_id: &KoderId) -> Result<(), TransportError> {
        self.calls.lock().await.push(StoreCall::Delete(koder_id.clone()));
        if *self.fail_delete.lock().await {
            return Err(Self::failure(StoreOperation::DeleteRecord));
        }
        self.remote.lock().await.retain(|koder| &koder.id != koder_id);
        Ok(())
    }
}

fn koder(id: &str, first: &str, last: &str, email: &str) -> Koder {
    NewKoder::new(first, last, email).with_id(KoderId::new(id))
}

fn existing() -> Koder {
    koder("k1", "Grace", "Hopper", "grace@example.com")
}

fn controller_for(store: &Arc<FakeRecordStore>) -> Arc<KodersController> {
    KodersController::new(store.clone(), SubmitPolicy::default())
}

async fn fill(controller: &KodersController, first: &str, last: &str, email: &str) {
    controller.update_field(Field::FirstName, first).await;
    controller.update_field(Field::LastName, last).await;
    controller.update_field(Field::Email, email).await;
}

fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn notifications(events: &[ClientEvent]) -> Vec<Notification> {
    events
        .iter()
        .filter_map(|event| match event {
            ClientEvent::Notification(n) => Some(n.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn initial_load_populates_list() {
    let store = FakeRecordStore::with_records(vec![existing()]);
    let controller = controller_for(&store);
    let mut rx = controller.subscribe_events();

    let outcome = controller.load().await;
    assert!(matches!(outcome, LoadOutcome::Loaded { count: 1 }));
    assert_eq!(controller.records().await, vec![existing()]);

    let events = drain(&mut rx);
    assert!(notifications(&events).is_empty(), "load must finish silently");
    assert!(events
        .iter()
        .any(|event| matches!(event, ClientEvent::RecordsReplaced(records) if records.len() == 1)));
}

#[tokio::test]
async fn failed_initial_load_shows_placeholder_and_notifies_once() {
    let store = FakeRecordStore::with_records(vec![existing()]);
    *store.fail_list.lock().await = true;
    let controller = controller_for(&store);
    let mut rx = controller.subscribe_events();

    let outcome = controller.load().await;
    assert!(matches!(outcome, LoadOutcome::Failed(_)));

    let view = controller.view().await;
    assert_eq!(view.list, ListView::Placeholder("No records"));

    let notes = notifications(&drain(&mut rx));
    assert_eq!(notes.len(), 1);
    assert!(notes[0].is_error());
    assert_eq!(notes[0].operation, Operation::Load);
}

#[tokio::test]
async fn short_first_name_blocks_submit_without_store_call() {
    let store = FakeRecordStore::with_records(Vec::new());
    let controller = controller_for(&store);
    fill(&controller, "A", "Jo", "a@b.co").await;

    let outcome = controller.submit().await;
    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "The name is too short");
    assert!(store.calls().await.is_empty());

    let form = controller.form().await;
    assert_eq!(form.error_message(Field::FirstName), Some("The name is too short"));
    assert!(!form.submit_enabled);
}

#[tokio::test]
async fn every_too_short_field_is_reported_and_nothing_is_created() {
    let store = FakeRecordStore::with_records(Vec::new());
    let controller = controller_for(&store);
    fill(&controller, "A", "J", "a@b").await;

    let SubmitOutcome::Invalid(errors) = controller.submit().await else {
        panic!("expected validation failure");
    };
    let messages: Vec<_> = errors.iter().map(|err| err.message()).collect();
    assert_eq!(
        messages,
        vec![
            "The name is too short",
            "The last name is too short",
            "The email is too short"
        ]
    );
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn email_without_at_sign_or_with_whitespace_is_invalid() {
    for email in ["alice.example.com", "ali ce@example.com"] {
        let store = FakeRecordStore::with_records(Vec::new());
        let controller = controller_for(&store);
        fill(&controller, "Alice", "Smith", email).await;

        let SubmitOutcome::Invalid(errors) = controller.submit().await else {
            panic!("expected validation failure for {email}");
        };
        assert_eq!(errors[0].message(), "Invalid email");
        assert!(store.calls().await.is_empty());
    }
}

#[tokio::test]
async fn successful_create_refetches_once_then_resets_form() {
    let store = FakeRecordStore::with_records(vec![existing()]);
    let controller = controller_for(&store);
    controller.load().await;
    fill(&controller, "Al", "Jo", "a@b.co").await;
    let mut rx = controller.subscribe_events();

    let outcome = controller.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Created { refreshed: true }));

    assert_eq!(
        store.calls().await,
        vec![
            StoreCall::List,
            StoreCall::Create(NewKoder::new("Al", "Jo", "a@b.co")),
            StoreCall::List,
        ]
    );
    assert_eq!(
        controller.records().await,
        vec![existing(), koder("srv-1", "Al", "Jo", "a@b.co")]
    );

    let form = controller.form().await;
    assert_eq!(form.values, NewKoder::new("", "", ""));
    assert_eq!(form.focus, Some(Field::FirstName));
    assert!(form.errors.is_empty());

    // Refetch lands before the form reset, which lands before the success toast.
    let events = drain(&mut rx);
    let order: Vec<&str> = events
        .iter()
        .map(|event| match event {
            ClientEvent::RecordsReplaced(_) => "records",
            ClientEvent::FormChanged(_) => "form",
            ClientEvent::FormReset(_) => "reset",
            ClientEvent::Notification(_) => "notification",
        })
        .collect();
    assert_eq!(order, vec!["form", "records", "reset", "notification"]);
    let notes = notifications(&events);
    assert_eq!(notes[0].message, "Koder created successfully");
    assert_eq!(notes[0].operation, Operation::Create);
}

#[tokio::test]
async fn failed_create_keeps_form_and_list() {
    let store = FakeRecordStore::with_records(vec![existing()]);
    *store.fail_create.lock().await = true;
    let controller = controller_for(&store);
    controller.load().await;
    fill(&controller, "Al", "Jo", "a@b.co").await;
    let mut rx = controller.subscribe_events();

    let outcome = controller.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));

    assert_eq!(store.list_calls().await, 1);
    assert_eq!(controller.records().await, vec![existing()]);
    let form = controller.form().await;
    assert_eq!(form.values, NewKoder::new("Al", "Jo", "a@b.co"));

    let notes = notifications(&drain(&mut rx));
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].operation, Operation::Create);
    assert!(notes[0].message.starts_with("Could not create koder"));
}

#[tokio::test]
async fn create_success_with_failed_refetch_still_reports_creation() {
    let store = FakeRecordStore::with_records(vec![existing()]);
    let controller = controller_for(&store);
    controller.load().await;
    fill(&controller, "Al", "Jo", "a@b.co").await;
    *store.fail_list.lock().await = true;
    let mut rx = controller.subscribe_events();

    let outcome = controller.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Created { refreshed: false }));
    assert_eq!(controller.records().await, vec![existing()]);
    assert_eq!(controller.form().await.values, NewKoder::new("", "", ""));

    let notes = notifications(&drain(&mut rx));
    let kinds: Vec<_> = notes.iter().map(|n| (n.operation, n.level)).collect();
    assert_eq!(
        kinds,
        vec![
            (Operation::Load, NotificationLevel::Error),
            (Operation::Create, NotificationLevel::Success),
        ]
    );
}

#[tokio::test]
async fn successful_delete_refetches_once_and_reports() {
    let target = koder("k2", "Ada", "Lovelace", "ada@example.com");
    let store = FakeRecordStore::with_records(vec![existing(), target.clone()]);
    let controller = controller_for(&store);
    controller.load().await;
    let mut rx = controller.subscribe_events();

    let outcome = controller.delete(&target.id).await;
    assert!(matches!(outcome, DeleteOutcome::Deleted { refreshed: true }));
    assert_eq!(
        store.calls().await,
        vec![StoreCall::List, StoreCall::Delete(target.id.clone()), StoreCall::List]
    );
    assert_eq!(controller.records().await, vec![existing()]);

    let notes = notifications(&drain(&mut rx));
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "Koder deleted successfully");
}

#[tokio::test]
async fn deleting_unknown_id_still_refetches_server_list() {
    let store = FakeRecordStore::with_records(vec![existing()]);
    let controller = controller_for(&store);
    controller.load().await;

    // Another client adds a record meanwhile; the refetch must pick it up.
    store
        .remote
        .lock()
        .await
        .push(koder("k9", "Linus", "Torvalds", "linus@example.com"));

    let outcome = controller.delete(&KoderId::new("missing")).await;
    assert!(matches!(outcome, DeleteOutcome::Deleted { refreshed: true }));
    assert_eq!(store.list_calls().await, 2);
    assert_eq!(controller.records().await.len(), 2);
}

#[tokio::test]
async fn failed_delete_leaves_list_unchanged() {
    let store = FakeRecordStore::with_records(vec![existing()]);
    *store.fail_delete.lock().await = true;
    let controller = controller_for(&store);
    controller.load().await;
    let mut rx = controller.subscribe_events();

    let outcome = controller.delete(&existing().id).await;
    assert!(matches!(outcome, DeleteOutcome::Failed(_)));
    assert_eq!(store.list_calls().await, 1);
    assert_eq!(controller.records().await, vec![existing()]);

    let notes = notifications(&drain(&mut rx));
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].operation, Operation::Delete);
    assert!(notes[0].is_error());
}

#[tokio::test]
async fn view_rows_are_bound_to_identifiers() {
    let store = FakeRecordStore::with_records(vec![
        koder("z", "Zed", "Shaw", "zed@example.com"),
        existing(),
    ]);
    let controller = controller_for(&store);
    controller.load().await;

    let ListView::Rows(rows) = controller.view().await.list else {
        panic!("expected rows");
    };
    let ids: Vec<_> = rows.iter().map(|row| row.id.as_str().to_string()).collect();
    assert_eq!(ids, vec!["z", "k1"]);
    assert_eq!(rows[1].display_name, "Grace Hopper");
}

#[tokio::test]
async fn status_line_appears_only_when_all_fields_pass() {
    let store = FakeRecordStore::with_records(Vec::new());
    let controller = controller_for(&store);
    fill(&controller, "Al", "Jo", "a@b").await;
    assert_eq!(controller.view().await.status_line(), None);

    controller.update_field(Field::Email, "a@b.co").await;
    assert_eq!(controller.view().await.status_line(), Some("Everything is ok"));
}

#[tokio::test]
async fn stale_refetch_cannot_overwrite_newer_list() {
    let store = FakeRecordStore::with_records(Vec::new());
    let (entered_tx, mut entered_rx) = mpsc::unbounded_channel();
    *store.list_entered.lock().await = Some(entered_tx);
    let (release_first, first_gate) = oneshot::channel();
    let (release_second, second_gate) = oneshot::channel();
    store
        .list_gates
        .lock()
        .await
        .extend([first_gate, second_gate]);
    let controller = controller_for(&store);

    // First refetch snapshots the empty remote list and stalls.
    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load().await }
    });
    entered_rx.recv().await.expect("first list entered");

    store.remote.lock().await.push(existing());

    // Second refetch snapshots the newer remote list.
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load().await }
    });
    entered_rx.recv().await.expect("second list entered");

    release_second.send(()).expect("release second");
    assert!(matches!(
        second.await.expect("join"),
        LoadOutcome::Loaded { count: 1 }
    ));

    release_first.send(()).expect("release first");
    assert!(matches!(
        first.await.expect("join"),
        LoadOutcome::Superseded
    ));

    assert_eq!(controller.records().await, vec![existing()]);
}

#[tokio::test]
async fn always_validate_policy_disables_submit_before_first_attempt() {
    let store = FakeRecordStore::with_records(Vec::new());
    let controller = KodersController::new(store.clone(), SubmitPolicy::AlwaysValidate);
    assert!(!controller.form().await.submit_enabled);

    let lenient = controller_for(&store);
    assert!(lenient.form().await.submit_enabled);
}
