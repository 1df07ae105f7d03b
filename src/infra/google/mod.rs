// Google API infra layer.
// - `auth.rs` turns service account credentials into access tokens.
// - `sheets_client.rs` reads the data range from Sheets.
// - `drive_client.rs` copies the template and manages permissions in Drive.
// - `docs_client.rs` sends the batch text replacement to Docs.

#[path = "auth.rs"]
pub mod auth;

#[path = "sheets_client.rs"]
pub mod sheets_client;

#[path = "drive_client.rs"]
pub mod drive_client;

#[path = "docs_client.rs"]
pub mod docs_client;
