use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::SlotScope,
    protocol::{
        AppointmentRecord, AppointmentsResponse, NewAppointment, SaveAppointmentResponse,
        SlotAvailability,
    },
};
use tracing::debug;
use url::Url;

pub mod cascade;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;

pub use cascade::{reduce, AvailabilityTicket, CascadeEvent, CascadeState, Effect, Notice};
pub use controller::CascadeController;
pub use error::ClientError;
pub use render::{AppointmentListView, ListNode, RecordNode};

const AVAILABLE_SLOTS: &str = "available_slots";
const GET_APPOINTMENTS: &str = "get_appointments";
const SAVE_APPOINTMENT: &str = "save_appointment";

/// Backend operations the booking cascade depends on.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn available_slots(&self, scope: &SlotScope) -> Result<SlotAvailability>;
    async fn appointments(&self) -> Result<Vec<AppointmentRecord>>;
    async fn save_appointment(&self, appointment: &NewAppointment)
        -> Result<SaveAppointmentResponse>;
}

pub struct HttpBookingClient {
    http: Client,
    base_url: Url,
}

impl HttpBookingClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(server_url).map_err(|err| ClientError::InvalidUrl {
            url: server_url.to_string(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: server_url.to_string(),
                reason: "url cannot carry path segments".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "url cannot carry path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn available_slots_url(&self, scope: &SlotScope) -> Result<Url, ClientError> {
        self.endpoint(&[
            AVAILABLE_SLOTS,
            scope.department.as_str(),
            scope.doctor.as_str(),
            scope.date.as_str(),
        ])
    }

    async fn read_json<T: DeserializeOwned>(
        endpoint: &'static str,
        response: Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { endpoint, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { endpoint, source })
    }

    pub async fn fetch_available_slots(
        &self,
        scope: &SlotScope,
    ) -> Result<SlotAvailability, ClientError> {
        let url = self.available_slots_url(scope)?;
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: AVAILABLE_SLOTS,
                source,
            })?;
        Self::read_json(AVAILABLE_SLOTS, response).await
    }

    pub async fn fetch_appointments(&self) -> Result<Vec<AppointmentRecord>, ClientError> {
        let url = self.endpoint(&[GET_APPOINTMENTS])?;
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: GET_APPOINTMENTS,
                source,
            })?;
        let body: AppointmentsResponse = Self::read_json(GET_APPOINTMENTS, response).await?;
        Ok(body.appointments)
    }

    pub async fn post_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<SaveAppointmentResponse, ClientError> {
        let url = self.endpoint(&[SAVE_APPOINTMENT])?;
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .json(appointment)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: SAVE_APPOINTMENT,
                source,
            })?;
        Self::read_json(SAVE_APPOINTMENT, response).await
    }
}

#[async_trait]
impl BookingApi for HttpBookingClient {
    async fn available_slots(&self, scope: &SlotScope) -> Result<SlotAvailability> {
        Ok(self.fetch_available_slots(scope).await?)
    }

    async fn appointments(&self) -> Result<Vec<AppointmentRecord>> {
        Ok(self.fetch_appointments().await?)
    }

    async fn save_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<SaveAppointmentResponse> {
        Ok(self.post_appointment(appointment).await?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
