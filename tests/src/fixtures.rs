//! Test fixtures and CSV generators.

use axum_test::multipart::{MultipartForm, Part};

pub const HEADER: &str = "id,firstName,lastName,email";

/// Two valid rows around one with an empty first name (row 3).
pub const MIXED_CSV: &str =
    "id,firstName,lastName,email\n1,Ann,Lee,ann@x.com\n2,,Smith,bad-email\n3,Bo,Wu,bo@y.io\n";

/// Builds a CSV file with the standard header.
pub fn csv(rows: &[[&str; 4]]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// `n` valid users with ids `{prefix}-0..n`.
pub fn users_csv(prefix: &str, n: usize) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for i in 0..n {
        out.push_str(&format!("{prefix}-{i},First{i},Last{i},user{i}@example.com\n"));
    }
    out
}

/// Multipart form with `contents` in the `file` field.
pub fn upload_form(contents: impl Into<Vec<u8>>, file_name: &str) -> MultipartForm {
    let bytes: Vec<u8> = contents.into();
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes)
            .file_name(file_name)
            .mime_type("text/csv"),
    )
}

/// Multipart form whose `file` part carries no client filename.
pub fn unnamed_upload_form(contents: impl Into<Vec<u8>>) -> MultipartForm {
    let bytes: Vec<u8> = contents.into();
    MultipartForm::new().add_part("file", Part::bytes(bytes).mime_type("text/csv"))
}
