//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{ClientEvent, ClientSettings, HttpRecordStore, KodersController};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let store = match HttpRecordStore::new(&settings.api_url) {
                Ok(store) => store,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(format!(
                        "backend worker startup failure: {err:#}"
                    )));
                    tracing::error!(api_url = %settings.api_url, "invalid record store url: {err:#}");
                    return;
                }
            };
            let controller = KodersController::new(Arc::new(store), settings.submit_policy);
            tokio::spawn(forward_client_events(controller.clone(), ui_tx.clone()));
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Backend worker ready ({})",
                settings.api_url
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    // Field edits are applied in arrival order; only store-bound
                    // commands run concurrently.
                    BackendCommand::UpdateField { field, value } => {
                        controller.update_field(field, value).await;
                    }
                    BackendCommand::Load => {
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            controller.load().await;
                        });
                    }
                    BackendCommand::Submit => {
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            controller.submit().await;
                        });
                    }
                    BackendCommand::Delete { koder_id } => {
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            controller.delete(&koder_id).await;
                        });
                    }
                }
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

async fn forward_client_events(controller: Arc<KodersController>, ui_tx: Sender<UiEvent>) {
    let mut events = controller.subscribe_events();
    loop {
        match events.recv().await {
            Ok(event) => {
                let ui_event = match event {
                    ClientEvent::RecordsReplaced(records) => UiEvent::RecordsReplaced(records),
                    ClientEvent::FormChanged(snapshot) => UiEvent::FormChanged(snapshot),
                    ClientEvent::FormReset(snapshot) => UiEvent::FormReset(snapshot),
                    ClientEvent::Notification(notification) => UiEvent::Notification(notification),
                };
                if ui_tx.send(ui_event).is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "ui event forwarder lagged behind controller");
                let _ = ui_tx.try_send(UiEvent::RecordsReplaced(controller.records().await));
                let _ = ui_tx.try_send(UiEvent::FormChanged(controller.form().await));
            }
            Err(RecvError::Closed) => break,
        }
    }
}
