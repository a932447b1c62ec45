//! IMPDS Session - Authentication token lifecycle.
//!
//! Owns the short-lived portal session and coordinates its renewal:
//!
//! - A session is fresh for a bounded window (30 minutes by default) after
//!   it is obtained; past that it must be renewed before use.
//! - Renewal is single-flight: however many callers ask for a valid session
//!   concurrently, at most one login attempt is in flight, and every caller
//!   observes that one attempt's outcome.
//! - Login itself is delegated to an [`Authenticator`], normally an
//!   external subprocess that performs the credential exchange and prints a
//!   token marker; a cached token file serves as the last-resort fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use impds_session::{CommandAuthenticator, SessionManager};
//! use std::sync::Arc;
//!
//! let manager = SessionManager::new(
//!     Arc::new(CommandAuthenticator::from_config(&config.login)),
//!     &config.login,
//!     &config.session,
//! );
//!
//! let token = manager.ensure_valid().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod authenticator;
pub mod error;
pub mod manager;
pub mod session;

pub use authenticator::{Authenticator, CommandAuthenticator, LoginOutcome};
pub use error::{Result, SessionError};
pub use manager::SessionManager;
pub use session::Session;
