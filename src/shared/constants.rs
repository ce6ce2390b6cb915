pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum size of a single uploaded file in bytes
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// MIME types accepted for attachment uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/zip",
    "text/plain",
    "text/csv",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

pub fn is_mime_type_allowed(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}
