//! HTTP API handlers for tandem-server

pub mod health;
pub mod languages;
pub mod matches;
pub mod me;
pub mod session;
pub mod signup;
pub mod users;

pub use health::health_routes;
pub use languages::list_languages;
pub use matches::get_matches;
pub use me::{delete_me, get_me, update_languages};
pub use session::{login, logout};
pub use signup::signup;
pub use users::list_users;

use serde::Serialize;

/// Simple acknowledgement body: `{"ok": true}`
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
