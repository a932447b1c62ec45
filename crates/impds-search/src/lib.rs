//! IMPDS Search - Duplicate-beneficiary lookup against the portal.
//!
//! Composes the session manager, the outbound search request, expiry
//! detection and the HTML response parser into a single retrying search
//! operation.
//!
//! # Flow
//!
//! 1. Ensure a fresh session via `impds-session`.
//! 2. Encode the sensitive identifier via `impds-cipher` (pass-through if
//!    it arrives already encoded).
//! 3. POST the form to the portal with browser-identifying headers and the
//!    session cookie.
//! 4. On a session-expiry signal (HTTP 500 or a logged-out body marker),
//!    invalidate the session and retry with a fresh one, up to a bound.
//! 5. Parse the two-table HTML payload into grouped ration card records.
//!
//! # Example
//!
//! ```rust,ignore
//! use impds_search::SearchClient;
//!
//! let client = SearchClient::new(session, codec, &config.portal, &config.search)?;
//! let records = client.search("A", "999988887777").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod orchestrator;
pub mod parser;

pub use error::{ParseError, Result, SearchError};
pub use orchestrator::SearchClient;
pub use parser::{
    parse_search_results, AdditionalInfo, FpsCategory, MemberRecord, RationCardRecord,
};
