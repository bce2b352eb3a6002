//! Backend commands queued from UI to backend worker.

use client_core::{AvailabilityTicket, Effect};
use shared::protocol::NewAppointment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    FetchAvailability(AvailabilityTicket),
    LoadAppointments(u64),
    SaveAppointment(NewAppointment),
}

impl BackendCommand {
    /// Network effects become commands; notices stay on the UI side.
    pub fn from_effect(effect: Effect) -> Result<Self, Effect> {
        match effect {
            Effect::FetchAvailability(ticket) => Ok(Self::FetchAvailability(ticket)),
            Effect::LoadAppointments(request_id) => Ok(Self::LoadAppointments(request_id)),
            Effect::SaveAppointment(appointment) => Ok(Self::SaveAppointment(appointment)),
            other => Err(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchAvailability(_) => "fetch_availability",
            Self::LoadAppointments(_) => "load_appointments",
            Self::SaveAppointment(_) => "save_appointment",
        }
    }
}
