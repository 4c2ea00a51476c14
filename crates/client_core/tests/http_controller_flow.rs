use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use client_core::{
    DeleteOutcome, HttpRecordStore, KodersController, ListView, LoadOutcome, SubmitOutcome,
    SubmitPolicy,
};
use shared::{
    domain::{Koder, KoderId, NewKoder},
    protocol::KodersResponse,
    validation::Field,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct RemoteKoders {
    koders: Arc<Mutex<Vec<Koder>>>,
    next_id: Arc<Mutex<u64>>,
}

async fn list(State(remote): State<RemoteKoders>) -> Json<KodersResponse> {
    Json(KodersResponse {
        koders: remote.koders.lock().await.clone(),
    })
}

async fn create(State(remote): State<RemoteKoders>, Json(new_koder): Json<NewKoder>) -> StatusCode {
    let mut next_id = remote.next_id.lock().await;
    *next_id += 1;
    let id = KoderId::new(format!("remote-{next_id}"));
    remote.koders.lock().await.push(new_koder.with_id(id));
    StatusCode::CREATED
}

async fn delete(State(remote): State<RemoteKoders>, Path(koder_id): Path<String>) -> StatusCode {
    remote
        .koders
        .lock()
        .await
        .retain(|koder| koder.id.as_str() != koder_id);
    StatusCode::OK
}

async fn spawn_remote(initial: Vec<Koder>) -> (String, RemoteKoders) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let remote = RemoteKoders::default();
    *remote.koders.lock().await = initial;
    let app = Router::new()
        .route("/koders", get(list).post(create))
        .route("/koders/:koder_id/delete", post(delete))
        .with_state(remote.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), remote)
}

#[tokio::test]
async fn create_then_delete_round_trips_through_http_store() {
    let existing = NewKoder::new("Grace", "Hopper", "grace@example.com").with_id(KoderId::new("g1"));
    let (server_url, remote) = spawn_remote(vec![existing.clone()]).await;
    let store = HttpRecordStore::new(&server_url).expect("store");
    let controller = KodersController::new(Arc::new(store), SubmitPolicy::default());

    assert!(matches!(
        controller.load().await,
        LoadOutcome::Loaded { count: 1 }
    ));

    controller.update_field(Field::FirstName, "Al").await;
    controller.update_field(Field::LastName, "Jo").await;
    controller.update_field(Field::Email, "a@b.co").await;
    assert!(matches!(
        controller.submit().await,
        SubmitOutcome::Created { refreshed: true }
    ));

    let created = NewKoder::new("Al", "Jo", "a@b.co").with_id(KoderId::new("remote-1"));
    assert_eq!(controller.records().await, vec![existing.clone(), created.clone()]);
    assert_eq!(*remote.koders.lock().await, vec![existing.clone(), created.clone()]);

    assert!(matches!(
        controller.delete(&existing.id).await,
        DeleteOutcome::Deleted { refreshed: true }
    ));
    assert_eq!(controller.records().await, vec![created.clone()]);

    assert!(matches!(
        controller.delete(&created.id).await,
        DeleteOutcome::Deleted { refreshed: true }
    ));
    assert_eq!(
        controller.view().await.list,
        ListView::Placeholder("No records")
    );
}

#[tokio::test]
async fn unreachable_store_leaves_empty_list() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let store = HttpRecordStore::new(&format!("http://{addr}")).expect("store");
    let controller = KodersController::new(Arc::new(store), SubmitPolicy::default());

    assert!(matches!(controller.load().await, LoadOutcome::Failed(_)));
    assert!(controller.records().await.is_empty());
}
