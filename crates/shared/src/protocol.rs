use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const SAVE_STATUS_SUCCESS: &str = "success";

/// Body of `GET /available_slots/{department}/{doctor}/{date}`.
///
/// Missing or non-array fields decode as empty; non-string entries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub all_slots: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_set")]
    pub booked_slots: HashSet<String>,
}

impl SlotAvailability {
    /// `all_slots` minus `booked_slots`, in `all_slots` order.
    pub fn open_slots(&self) -> Vec<String> {
        self.all_slots
            .iter()
            .filter(|slot| !self.booked_slots.contains(*slot))
            .cloned()
            .collect()
    }
}

/// A saved appointment as reported by `GET /get_appointments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub department: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub doctor: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentsResponse {
    #[serde(default, deserialize_with = "lenient_records")]
    pub appointments: Vec<AppointmentRecord>,
}

/// Body of `POST /save_appointment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub department: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
    pub issue: String,
}

impl NewAppointment {
    pub fn has_required_fields(&self) -> bool {
        !self.department.is_empty()
            && !self.doctor.is_empty()
            && !self.date.is_empty()
            && !self.time.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAppointmentResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: String,
}

impl SaveAppointmentResponse {
    pub fn is_success(&self) -> bool {
        self.status == SAVE_STATUS_SUCCESS
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn string_items(value: Option<Value>) -> impl Iterator<Item = String> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    items.into_iter().filter_map(|item| match item {
        Value::String(text) => Some(text),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_text).unwrap_or_default())
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(string_items(value).collect())
}

fn lenient_string_set<'de, D>(deserializer: D) -> Result<HashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(string_items(value).collect())
}

fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<AppointmentRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    // A non-object entry still occupies a row, rendered with empty fields.
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}
