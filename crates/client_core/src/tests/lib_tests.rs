use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use super::*;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct ServerState {
    saved: Arc<Mutex<Option<oneshot::Sender<(Option<String>, NewAppointment)>>>>,
}

async fn handle_available_slots(
    Path((department, doctor, date)): Path<(String, String, String)>,
) -> impl IntoResponse {
    match department.as_str() {
        "Broken" => (StatusCode::SERVICE_UNAVAILABLE, "down").into_response(),
        "Garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "Sparse" => Json(json!({ "all_slots": "09:00" })).into_response(),
        _ => Json(json!({
            "all_slots": ["09:00", "10:00", "11:00"],
            "booked_slots": ["10:00"],
            "echo": [department, doctor, date],
        }))
        .into_response(),
    }
}

async fn handle_get_appointments() -> Json<serde_json::Value> {
    Json(json!({
        "appointments": [
            {"department": "ENT", "doctor": "Dr. Ng", "date": "2025-03-01", "time": "09:00", "issue": "earache"},
            {"department": "Cardiology", "time": "11:00"}
        ]
    }))
}

async fn handle_save_appointment(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<NewAppointment>,
) -> Json<serde_json::Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let rejected = payload.time == "10:00";
    if let Some(tx) = state.saved.lock().await.take() {
        let _ = tx.send((content_type, payload));
    }

    if rejected {
        Json(json!({ "status": "error", "message": "Slot already taken" }))
    } else {
        Json(json!({ "status": "success", "message": "Appointment added!" }))
    }
}

async fn spawn_booking_server() -> Result<(
    String,
    oneshot::Receiver<(Option<String>, NewAppointment)>,
)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        saved: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route(
            "/available_slots/:department/:doctor/:date",
            get(handle_available_slots),
        )
        .route("/get_appointments", get(handle_get_appointments))
        .route("/save_appointment", post(handle_save_appointment))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), rx))
}

fn client(server_url: &str) -> HttpBookingClient {
    HttpBookingClient::new(server_url, Duration::from_secs(5)).expect("client")
}

fn sample_appointment(time: &str) -> NewAppointment {
    NewAppointment {
        department: "ENT".into(),
        doctor: "Dr. Ng".into(),
        date: "2025-03-01".into(),
        time: time.into(),
        issue: "earache".into(),
    }
}

#[test]
fn available_slots_url_percent_encodes_every_segment() {
    let client = client("http://clinic.local:5000");
    let url = client
        .available_slots_url(&SlotScope::new(
            "General Medicine",
            "Dr. A/B",
            "2025-03-01",
        ))
        .expect("url");
    assert_eq!(
        url.as_str(),
        "http://clinic.local:5000/available_slots/General%20Medicine/Dr.%20A%2FB/2025-03-01"
    );
}

#[test]
fn endpoints_extend_a_base_path() {
    let client = client("http://clinic.local/booking/");
    let url = client
        .available_slots_url(&SlotScope::new("ENT", "Dr. Ng", "2025-03-01"))
        .expect("url");
    assert_eq!(
        url.as_str(),
        "http://clinic.local/booking/available_slots/ENT/Dr.%20Ng/2025-03-01"
    );
}

#[test]
fn rejects_unusable_server_urls() {
    assert!(matches!(
        HttpBookingClient::new("not a url", Duration::from_secs(1)),
        Err(ClientError::InvalidUrl { .. })
    ));
    assert!(matches!(
        HttpBookingClient::new("mailto:desk@clinic.local", Duration::from_secs(1)),
        Err(ClientError::InvalidUrl { .. })
    ));
}

#[tokio::test]
async fn fetches_available_slots_with_decoded_path_segments() {
    let (server_url, _saved) = spawn_booking_server().await.expect("spawn server");
    let client = client(&server_url);

    let availability = client
        .fetch_available_slots(&SlotScope::new(
            "General Medicine",
            "Dr. O'Neil",
            "2025-03-01",
        ))
        .await
        .expect("availability");

    assert_eq!(availability.open_slots(), vec!["09:00", "11:00"]);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (server_url, _saved) = spawn_booking_server().await.expect("spawn server");
    let err = client(&server_url)
        .fetch_available_slots(&SlotScope::new("Broken", "Dr. Ng", "2025-03-01"))
        .await
        .expect_err("must fail");

    assert!(matches!(
        err,
        ClientError::Status { endpoint, status }
            if endpoint == "available_slots" && status == StatusCode::SERVICE_UNAVAILABLE
    ));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let (server_url, _saved) = spawn_booking_server().await.expect("spawn server");
    let err = client(&server_url)
        .fetch_available_slots(&SlotScope::new("Garbled", "Dr. Ng", "2025-03-01"))
        .await
        .expect_err("must fail");

    assert!(matches!(
        err,
        ClientError::Decode { endpoint, .. } if endpoint == "available_slots"
    ));
}

#[tokio::test]
async fn malformed_slot_fields_become_empty_availability() {
    let (server_url, _saved) = spawn_booking_server().await.expect("spawn server");
    let availability = client(&server_url)
        .fetch_available_slots(&SlotScope::new("Sparse", "Dr. Ng", "2025-03-01"))
        .await
        .expect("availability");

    assert!(availability.open_slots().is_empty());
}

#[tokio::test]
async fn fetches_appointment_list() {
    let (server_url, _saved) = spawn_booking_server().await.expect("spawn server");
    let appointments = client(&server_url)
        .fetch_appointments()
        .await
        .expect("appointments");

    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0].doctor, "Dr. Ng");
    assert_eq!(appointments[1].doctor, "");
    assert_eq!(appointments[1].time, "11:00");
}

#[tokio::test]
async fn posts_appointment_as_json() {
    let (server_url, saved) = spawn_booking_server().await.expect("spawn server");
    let response = client(&server_url)
        .post_appointment(&sample_appointment("09:00"))
        .await
        .expect("save");

    assert!(response.is_success());
    assert_eq!(response.message, "Appointment added!");

    let (content_type, payload) = saved.await.expect("payload");
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(payload, sample_appointment("09:00"));
}

#[tokio::test]
async fn application_rejection_is_not_an_error() {
    let (server_url, _saved) = spawn_booking_server().await.expect("spawn server");
    let response = client(&server_url)
        .post_appointment(&sample_appointment("10:00"))
        .await
        .expect("save");

    assert!(!response.is_success());
    assert_eq!(response.message, "Slot already taken");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .fetch_appointments()
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        ClientError::Transport { endpoint, .. } if endpoint == "get_appointments"
    ));
}

#[tokio::test]
async fn booking_api_trait_wraps_client_errors() {
    let (server_url, _saved) = spawn_booking_server().await.expect("spawn server");
    let api: Arc<dyn BookingApi> = Arc::new(client(&server_url));

    let err = api
        .available_slots(&SlotScope::new("Broken", "Dr. Ng", "2025-03-01"))
        .await
        .expect_err("must fail");
    assert!(format!("{err:#}").contains("HTTP 503"));

    let records = api.appointments().await.expect("appointments");
    assert_eq!(records.len(), 2);
}

/// Serves the list once, then fails every list load and every save with 500.
async fn spawn_failing_server() -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let list_calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/available_slots/:department/:doctor/:date",
            get(handle_available_slots),
        )
        .route(
            "/get_appointments",
            get(move || {
                let list_calls = Arc::clone(&list_calls);
                async move {
                    if list_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        handle_get_appointments().await.into_response()
                    } else {
                        (StatusCode::INTERNAL_SERVER_ERROR, "db locked").into_response()
                    }
                }
            }),
        )
        .route(
            "/save_appointment",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "db locked") }),
        );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn save_and_list_report_server_errors() {
    let server_url = spawn_failing_server().await.expect("spawn server");
    let client = client(&server_url);

    client.fetch_appointments().await.expect("first list load");
    let err = client.fetch_appointments().await.expect_err("must fail");
    assert!(matches!(
        err,
        ClientError::Status { endpoint, status }
            if endpoint == "get_appointments" && status == StatusCode::INTERNAL_SERVER_ERROR
    ));

    let err = client
        .post_appointment(&sample_appointment("09:00"))
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        ClientError::Status { endpoint, status }
            if endpoint == "save_appointment" && status == StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn server_errors_give_generic_notice_and_keep_the_list() {
    let server_url = spawn_failing_server().await.expect("spawn server");
    let directory = Arc::new(
        shared::domain::Directory::from_json_str(r#"{"ENT": {"Dr. Ng": {}}}"#)
            .expect("directory"),
    );
    let mut controller = CascadeController::new(Arc::new(client(&server_url)), directory);
    controller.start().await;
    assert_eq!(controller.state().appointments().record_count(), 2);

    for event in [
        CascadeEvent::DepartmentChanged("ENT".into()),
        CascadeEvent::DoctorChanged("Dr. Ng".into()),
        CascadeEvent::DateChanged("2025-03-01".into()),
        CascadeEvent::TimeChanged("09:00".into()),
        CascadeEvent::IssueChanged("earache".into()),
    ] {
        controller.dispatch(event).await;
    }
    assert_eq!(controller.state().time(), "09:00");

    let notices = controller.dispatch(CascadeEvent::Submitted).await;
    assert_eq!(notices, vec![Notice::SaveFailed]);
    assert_eq!(controller.state().time(), "09:00");

    controller.dispatch(CascadeEvent::Started).await;
    assert_eq!(controller.state().appointments().record_count(), 2);
}
