pub mod brand;
pub mod guard;
pub mod push;
pub mod user_admin;

use serde::Serialize;

/// Plain acknowledgement body for operations with nothing else to report.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}
