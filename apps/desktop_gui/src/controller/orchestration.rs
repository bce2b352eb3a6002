//! Command orchestration helpers from cascade effects to backend command queue.

use client_core::{Effect, Notice};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorKind};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), UiError> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(UiError::new(
            UiErrorKind::QueueFull,
            "UI command queue is full; please retry",
        )),
        Err(TrySendError::Disconnected(_)) => Err(UiError::new(
            UiErrorKind::QueueDisconnected,
            "Backend command processor disconnected (possible startup/runtime failure); restart the app",
        )),
    }
}

/// Effects a reducer step produced, split into what the UI shows now and
/// what failed to reach the backend.
#[derive(Debug, Default)]
pub struct EffectOutcome {
    pub notices: Vec<Notice>,
    pub error: Option<UiError>,
}

pub fn run_effects(cmd_tx: &Sender<BackendCommand>, effects: Vec<Effect>) -> EffectOutcome {
    let mut outcome = EffectOutcome::default();
    for effect in effects {
        match BackendCommand::from_effect(effect) {
            Ok(cmd) => {
                if let Err(err) = dispatch_backend_command(cmd_tx, cmd) {
                    tracing::warn!("{}", err.message());
                    outcome.error.get_or_insert(err);
                }
            }
            Err(Effect::Notify(notice)) => outcome.notices.push(notice),
            Err(other) => tracing::warn!("effect {other:?} has no backend command"),
        }
    }
    outcome
}
