//! IMPDS Server - JSON API over the duplicate-beneficiary lookup core.
//!
//! A thin request/response adapter: routes, parameter validation and
//! error-to-status mapping live here; all behavior belongs to the core
//! crates.
//!
//! # Endpoints
//!
//! - `GET /search-aadhaar?search=<term>&aadhaar=<identifier>`
//! - `GET /crypto?action=encrypt|decrypt&text=<value>`
//! - `GET /health`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
