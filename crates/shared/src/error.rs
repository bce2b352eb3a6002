use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("directory must be an object mapping department names to doctors")]
    NotAnObject,
    #[error("department '{department}' must map doctor names to metadata")]
    InvalidDepartment { department: String },
}
