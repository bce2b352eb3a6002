use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DirectoryError;

/// One department and its doctors, in the order the source mapping lists them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentEntry {
    pub name: String,
    pub doctors: Vec<String>,
}

/// Static department -> doctor reference data, read once at start-up.
///
/// The source format is `{ "<department>": { "<doctor>": <metadata>, ... }, ... }`.
/// Doctor metadata is accepted but not retained; only key order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    departments: Vec<DepartmentEntry>,
}

impl Directory {
    pub fn from_json_str(raw: &str) -> Result<Self, DirectoryError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, DirectoryError> {
        let Value::Object(departments) = value else {
            return Err(DirectoryError::NotAnObject);
        };

        let mut entries = Vec::with_capacity(departments.len());
        for (name, doctors) in departments {
            let Value::Object(doctors) = doctors else {
                return Err(DirectoryError::InvalidDepartment {
                    department: name.clone(),
                });
            };
            entries.push(DepartmentEntry {
                name: name.clone(),
                doctors: doctors.keys().cloned().collect(),
            });
        }

        Ok(Self {
            departments: entries,
        })
    }

    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.departments.iter().map(|entry| entry.name.as_str())
    }

    pub fn contains_department(&self, department: &str) -> bool {
        self.departments
            .iter()
            .any(|entry| entry.name == department)
    }

    /// Doctors for `department`, or an empty slice when it is unknown.
    pub fn doctors(&self, department: &str) -> &[String] {
        self.departments
            .iter()
            .find(|entry| entry.name == department)
            .map(|entry| entry.doctors.as_slice())
            .unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Directory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}

/// The (department, doctor, date) triple that scopes one availability read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotScope {
    pub department: String,
    pub doctor: String,
    pub date: String,
}

impl SlotScope {
    pub fn new(
        department: impl Into<String>,
        doctor: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            department: department.into(),
            doctor: doctor.into(),
            date: date.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.department.is_empty() && !self.doctor.is_empty() && !self.date.is_empty()
    }
}
