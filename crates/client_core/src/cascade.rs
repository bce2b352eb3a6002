//! Department -> doctor -> date -> time cascade as a pure reducer.
//!
//! `reduce` never performs I/O. Network work is requested through [`Effect`]s and
//! its completion comes back as another [`CascadeEvent`].

use std::sync::Arc;

use shared::{
    domain::{Directory, SlotScope},
    protocol::{AppointmentRecord, NewAppointment, SaveAppointmentResponse, SlotAvailability},
};
use tracing::{debug, error, info, warn};

use crate::render::AppointmentListView;

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields.";
pub const SAVE_FAILED: &str = "Failed to save appointment.";
pub const SAVE_CONFIRMED: &str = "Appointment saved.";

/// Tag attached to one availability request.
///
/// A completion is applied only while its ticket is the outstanding one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityTicket {
    pub request_id: u64,
    pub scope: SlotScope,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CascadeEvent {
    Started,
    DepartmentChanged(String),
    DoctorChanged(String),
    DateChanged(String),
    TimeChanged(String),
    IssueChanged(String),
    Submitted,
    AvailabilityLoaded {
        ticket: AvailabilityTicket,
        outcome: Result<SlotAvailability, String>,
    },
    AppointmentsLoaded {
        request_id: u64,
        outcome: Result<Vec<AppointmentRecord>, String>,
    },
    SaveCompleted(Result<SaveAppointmentResponse, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchAvailability(AvailabilityTicket),
    /// Carries the id its `AppointmentsLoaded` completion must echo back.
    LoadAppointments(u64),
    SaveAppointment(NewAppointment),
    Notify(Notice),
}

/// User-visible messages produced by the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MissingFields,
    Confirmation(String),
    Rejected(String),
    SaveFailed,
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::MissingFields => FILL_ALL_FIELDS,
            Self::Confirmation(message) | Self::Rejected(message) => message.as_str(),
            Self::SaveFailed => SAVE_FAILED,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Confirmation(_))
    }
}

#[derive(Debug, Clone)]
pub struct CascadeState {
    directory: Arc<Directory>,
    department: String,
    doctor: String,
    date: String,
    time: String,
    issue: String,
    doctor_options: Vec<String>,
    time_options: Vec<String>,
    appointments: AppointmentListView,
    next_request_id: u64,
    pending_availability: Option<AvailabilityTicket>,
    pending_reload: Option<u64>,
    /// The reload issued by a successful save; the form resets when it lands.
    reset_after_reload: Option<u64>,
}

impl CascadeState {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self {
            directory,
            department: String::new(),
            doctor: String::new(),
            date: String::new(),
            time: String::new(),
            issue: String::new(),
            doctor_options: Vec::new(),
            time_options: Vec::new(),
            appointments: AppointmentListView::default(),
            next_request_id: 1,
            pending_availability: None,
            pending_reload: None,
            reset_after_reload: None,
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn doctor(&self) -> &str {
        &self.doctor
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn issue(&self) -> &str {
        &self.issue
    }

    pub fn doctor_options(&self) -> &[String] {
        &self.doctor_options
    }

    pub fn time_options(&self) -> &[String] {
        &self.time_options
    }

    pub fn appointments(&self) -> &AppointmentListView {
        &self.appointments
    }

    pub fn scope(&self) -> SlotScope {
        SlotScope::new(&self.department, &self.doctor, &self.date)
    }

    pub fn pending_availability(&self) -> Option<&AvailabilityTicket> {
        self.pending_availability.as_ref()
    }

    pub fn draft(&self) -> NewAppointment {
        NewAppointment {
            department: self.department.clone(),
            doctor: self.doctor.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            issue: self.issue.trim().to_string(),
        }
    }

    pub fn apply(&mut self, event: CascadeEvent) -> Vec<Effect> {
        match event {
            CascadeEvent::Started => vec![Effect::LoadAppointments(self.issue_reload())],
            CascadeEvent::DepartmentChanged(department) => {
                self.department = if self.directory.contains_department(&department) {
                    department
                } else {
                    if !department.is_empty() {
                        debug!("department '{department}' is not in the directory; clearing");
                    }
                    String::new()
                };
                self.doctor.clear();
                self.doctor_options = self.directory.doctors(&self.department).to_vec();
                self.clear_time();
                Vec::new()
            }
            CascadeEvent::DoctorChanged(doctor) => {
                self.doctor = pick_option(&self.doctor_options, doctor, "doctor");
                self.clear_time();
                self.refresh_availability()
            }
            CascadeEvent::DateChanged(date) => {
                self.date = date.trim().to_string();
                self.clear_time();
                self.refresh_availability()
            }
            CascadeEvent::TimeChanged(time) => {
                self.time = pick_option(&self.time_options, time, "time");
                Vec::new()
            }
            CascadeEvent::IssueChanged(issue) => {
                self.issue = issue;
                Vec::new()
            }
            CascadeEvent::Submitted => {
                let appointment = self.draft();
                if !appointment.has_required_fields() {
                    return vec![Effect::Notify(Notice::MissingFields)];
                }
                vec![Effect::SaveAppointment(appointment)]
            }
            CascadeEvent::AvailabilityLoaded { ticket, outcome } => {
                self.apply_availability(ticket, outcome);
                Vec::new()
            }
            CascadeEvent::AppointmentsLoaded {
                request_id,
                outcome,
            } => self.apply_appointments(request_id, outcome),
            CascadeEvent::SaveCompleted(outcome) => self.apply_save(outcome),
        }
    }

    fn clear_time(&mut self) {
        self.time.clear();
        self.time_options.clear();
        self.pending_availability = None;
    }

    fn refresh_availability(&mut self) -> Vec<Effect> {
        let scope = self.scope();
        if !scope.is_complete() {
            return Vec::new();
        }

        let ticket = AvailabilityTicket {
            request_id: self.next_request_id,
            scope,
        };
        self.next_request_id += 1;
        self.pending_availability = Some(ticket.clone());
        vec![Effect::FetchAvailability(ticket)]
    }

    fn apply_availability(
        &mut self,
        ticket: AvailabilityTicket,
        outcome: Result<SlotAvailability, String>,
    ) {
        if self.pending_availability.as_ref() != Some(&ticket) || ticket.scope != self.scope() {
            debug!(
                request_id = ticket.request_id,
                "discarding stale availability for {}/{}/{}",
                ticket.scope.department,
                ticket.scope.doctor,
                ticket.scope.date
            );
            return;
        }
        self.pending_availability = None;

        match outcome {
            Ok(availability) => self.time_options = availability.open_slots(),
            Err(reason) => {
                warn!(
                    request_id = ticket.request_id,
                    "error fetching available slots: {reason}"
                );
                self.time_options.clear();
            }
        }
    }

    /// Supersedes any reload still in flight.
    fn issue_reload(&mut self) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending_reload = Some(request_id);
        request_id
    }

    fn apply_appointments(
        &mut self,
        request_id: u64,
        outcome: Result<Vec<AppointmentRecord>, String>,
    ) -> Vec<Effect> {
        if self.pending_reload != Some(request_id) {
            debug!(request_id, "discarding superseded appointment list");
            return Vec::new();
        }
        self.pending_reload = None;

        match outcome {
            Ok(records) => {
                info!(count = records.len(), "loaded appointments");
                self.appointments = AppointmentListView::from_records(&records);
            }
            Err(reason) => warn!("error loading appointments: {reason}"),
        }

        if self.reset_after_reload != Some(request_id) {
            return Vec::new();
        }
        self.reset_after_reload = None;
        self.reset_form();
        self.refresh_availability()
    }

    fn apply_save(&mut self, outcome: Result<SaveAppointmentResponse, String>) -> Vec<Effect> {
        match outcome {
            Ok(response) if response.is_success() => {
                let reload = self.issue_reload();
                self.reset_after_reload = Some(reload);
                let message = if response.message.is_empty() {
                    SAVE_CONFIRMED.to_string()
                } else {
                    response.message
                };
                vec![
                    Effect::Notify(Notice::Confirmation(message)),
                    Effect::LoadAppointments(reload),
                ]
            }
            Ok(response) => {
                let message = if response.message.is_empty() {
                    SAVE_FAILED.to_string()
                } else {
                    response.message
                };
                vec![Effect::Notify(Notice::Rejected(message))]
            }
            Err(reason) => {
                error!("error saving appointment: {reason}");
                vec![Effect::Notify(Notice::SaveFailed)]
            }
        }
    }

    fn reset_form(&mut self) {
        self.department.clear();
        self.doctor.clear();
        self.date.clear();
        self.issue.clear();
        self.doctor_options.clear();
        self.clear_time();
    }
}

/// Same contract as a select element: a value outside the options falls back to empty.
fn pick_option(options: &[String], value: String, field: &str) -> String {
    if value.is_empty() || options.contains(&value) {
        return value;
    }
    debug!("{field} '{value}' is not a current option; clearing");
    String::new()
}

pub fn reduce(mut state: CascadeState, event: CascadeEvent) -> (CascadeState, Vec<Effect>) {
    let effects = state.apply(event);
    (state, effects)
}

#[cfg(test)]
#[path = "tests/cascade_tests.rs"]
mod tests;
