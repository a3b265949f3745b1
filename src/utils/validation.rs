use uuid::Uuid;

/// Image extensions accepted on upload (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(code: &'static str, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::api::error::AppError {
    fn from(e: ValidationError) -> Self {
        crate::api::error::AppError::Validation(e.message)
    }
}

/// Returns the lowercased extension of `filename` if it is an allowed image type.
///
/// The extension is the text after the last `.`; the file content is never inspected.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Validates the client-supplied name of an uploaded file and returns its extension.
pub fn validate_upload_filename(filename: Option<&str>) -> Result<String, ValidationError> {
    let filename = filename.unwrap_or_default();
    if filename.is_empty() {
        return Err(ValidationError::new("NO_FILE", "No file selected"));
    }
    allowed_extension(filename)
        .ok_or_else(|| ValidationError::new("INVALID_FILE_TYPE", "Invalid file type"))
}

/// Trims `title` and rejects it when nothing is left.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::new("TITLE_REQUIRED", "Title is required"));
    }
    Ok(title.to_string())
}

/// Blank descriptions are stored as absent.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Opaque, collision-free name under which an upload is stored.
pub fn generate_stored_filename(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

pub fn invalid_credentials_format() -> ValidationError {
    ValidationError::new(
        "INVALID_CREDENTIALS_FORMAT",
        "Username must be at least 3 characters and password at least 6 characters",
    )
}
