//! Sequential driver that executes cascade effects against a [`BookingApi`].

use std::{collections::VecDeque, sync::Arc};

use shared::domain::Directory;
use tracing::info;

use crate::{
    cascade::{CascadeEvent, CascadeState, Effect, Notice},
    BookingApi,
};

/// Owns the cascade state and runs every effect to completion before returning.
///
/// Completions are fed back in the order their effects were produced, so a
/// successful save shows its confirmation, reloads the list and only then resets
/// the form.
pub struct CascadeController {
    api: Arc<dyn BookingApi>,
    state: CascadeState,
}

impl CascadeController {
    pub fn new(api: Arc<dyn BookingApi>, directory: Arc<Directory>) -> Self {
        Self {
            api,
            state: CascadeState::new(directory),
        }
    }

    pub fn state(&self) -> &CascadeState {
        &self.state
    }

    /// Loads the appointment list once, as on first render.
    pub async fn start(&mut self) -> Vec<Notice> {
        self.dispatch(CascadeEvent::Started).await
    }

    pub async fn dispatch(&mut self, event: CascadeEvent) -> Vec<Notice> {
        let mut notices = Vec::new();
        let mut queue: VecDeque<Effect> = self.state.apply(event).into();

        while let Some(effect) = queue.pop_front() {
            let completion = match effect {
                Effect::Notify(notice) => {
                    info!("notice: {}", notice.message());
                    notices.push(notice);
                    continue;
                }
                Effect::FetchAvailability(ticket) => {
                    let outcome = self
                        .api
                        .available_slots(&ticket.scope)
                        .await
                        .map_err(|err| format!("{err:#}"));
                    CascadeEvent::AvailabilityLoaded { ticket, outcome }
                }
                Effect::LoadAppointments(request_id) => CascadeEvent::AppointmentsLoaded {
                    request_id,
                    outcome: self
                        .api
                        .appointments()
                        .await
                        .map_err(|err| format!("{err:#}")),
                },
                Effect::SaveAppointment(appointment) => CascadeEvent::SaveCompleted(
                    self.api
                        .save_appointment(&appointment)
                        .await
                        .map_err(|err| format!("{err:#}")),
                ),
            };
            queue.extend(self.state.apply(completion));
        }

        notices
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
