//! Limits and fixed formats for the user import service.
//!
//! The CSV contract is fixed: a header row that is ignored, then rows with
//! the four required columns `id, firstName, lastName, email` in that order.

// === CSV Contract ===

/// Number of leading columns every data row must carry.
pub const REQUIRED_COLUMNS: usize = 4;

/// Column names in positional order (used in error messages only).
pub const REQUIRED_COLUMN_NAMES: [&str; REQUIRED_COLUMNS] = ["id", "firstName", "lastName", "email"];

/// Row number reported for file-level failures (nothing was read).
pub const FILE_LEVEL_ROW: usize = 0;

/// 1-based row number of the first data row (the header is row 1).
pub const FIRST_DATA_ROW: usize = 2;

/// Email pattern: `localpart@domain.tld`.
///
/// Localpart allows letters, digits and `+_.-`; the domain allows letters,
/// digits, `.` and `-`; the TLD is at least two letters.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

// === Upload Limits ===

/// Default base directory for stored uploads, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default maximum upload request body (10MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Filename used when the client did not send one.
pub const FALLBACK_FILE_NAME: &str = "unknown.csv";

/// Accepted upload extension (compared case-insensitively).
pub const CSV_EXTENSION: &str = ".csv";
