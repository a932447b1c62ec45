//! The login capability and its external-process implementation.

use crate::error::Result;
use async_trait::async_trait;
use impds_core::LoginConfig;
use regex::Regex;
use std::sync::OnceLock;
use tokio::process::Command;

/// Outcome of a single login attempt.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Token extracted from the collaborator's output, if any.
    pub token: Option<String>,
    /// Diagnostic output observed during the attempt, kept for error
    /// reporting when every attempt fails.
    pub diagnostics: String,
}

/// Capability to attempt one login against the portal.
///
/// The session manager drives retries; implementations perform exactly one
/// attempt per call. Tests substitute a fake.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Attempt a login, returning the token if one was produced.
    ///
    /// A `LoginOutcome` with `token: None` is a completed-but-unsuccessful
    /// attempt; `Err` is reserved for failures to run the attempt at all.
    async fn attempt_login(&self) -> Result<LoginOutcome>;
}

/// Authenticator that spawns an external command for the credential
/// exchange and scans its stdout for the token success marker.
#[derive(Debug, Clone)]
pub struct CommandAuthenticator {
    command: String,
    args: Vec<String>,
}

impl CommandAuthenticator {
    /// Create an authenticator for the given command and arguments.
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Create an authenticator from the login configuration.
    #[must_use]
    pub fn from_config(config: &LoginConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

#[async_trait]
impl Authenticator for CommandAuthenticator {
    async fn attempt_login(&self) -> Result<LoginOutcome> {
        tracing::debug!("Spawning login collaborator: {}", self.command);

        let output = Command::new(&self.command)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let token = extract_token(&stdout);
        if token.is_none() {
            tracing::warn!(
                "Login collaborator exited ({:?}) without a token marker",
                output.status.code()
            );
        }

        // stderr is the more useful diagnostic when present
        let diagnostics = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };

        Ok(LoginOutcome { token, diagnostics })
    }
}

/// Extract the session token from the collaborator's success marker.
///
/// The collaborator prints `JSESSIONID: <uppercase hex>` on success.
#[must_use]
pub fn extract_token(stdout: &str) -> Option<String> {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = TOKEN_REGEX
        .get_or_init(|| Regex::new(r"JSESSIONID: ([0-9A-F]+)").expect("valid regex"));

    regex
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
