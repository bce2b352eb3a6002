//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{BookingApi, CascadeEvent};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorKind, UiEvent};

/// Spawns the backend thread. Each command runs as its own task so a slow
/// availability lookup never holds up a save.
pub fn launch(api: Arc<dyn BookingApi>, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorKind::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));
            while let Ok(cmd) = cmd_rx.recv() {
                let api = Arc::clone(&api);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let name = cmd.name();
                    let completion = execute(api.as_ref(), cmd).await;
                    if ui_tx.send(UiEvent::Cascade(completion)).is_err() {
                        tracing::debug!(command = name, "ui closed before completion arrived");
                    }
                });
            }
            tracing::debug!("command queue closed; backend worker exiting");
        });
    });
}

/// Runs one command and turns its outcome into the completion event the cascade expects.
pub async fn execute(api: &dyn BookingApi, cmd: BackendCommand) -> CascadeEvent {
    match cmd {
        BackendCommand::FetchAvailability(ticket) => {
            let outcome = api
                .available_slots(&ticket.scope)
                .await
                .map_err(|err| format!("{err:#}"));
            CascadeEvent::AvailabilityLoaded { ticket, outcome }
        }
        BackendCommand::LoadAppointments(request_id) => CascadeEvent::AppointmentsLoaded {
            request_id,
            outcome: api.appointments().await.map_err(|err| format!("{err:#}")),
        },
        BackendCommand::SaveAppointment(appointment) => CascadeEvent::SaveCompleted(
            api.save_appointment(&appointment)
                .await
                .map_err(|err| format!("{err:#}")),
        ),
    }
}
