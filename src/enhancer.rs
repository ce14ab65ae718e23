//! Optional external enhancer
//!
//! The enhancer is an external program. It receives one JSON request on stdin
//! and may answer with one JSON object on stdout. The call is raced against a
//! timeout; on timeout the child is killed (`kill_on_drop`) and the reading
//! goes out without enhancement. Any failure is logged and treated as absence.
//!
//! Only the first 8 hex chars of the seed are ever sent.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::EnhancerSettings;
use crate::models::{Enhancement, Reading, Seed};

/// Context sent alongside the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementContext {
    pub partial_seed: String,
    pub sequence_number: u32,
    pub resonance_value: u8,
    pub pattern_label: String,
}

/// Request written to the enhancer's stdin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementRequest {
    pub query: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub context: EnhancementContext,
}

impl EnhancementRequest {
    /// Build a request from a freshly computed reading
    pub fn for_reading(query: &str, seed: &Seed, sequence_number: u32, reading: &Reading) -> Self {
        Self {
            query: query.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            context: EnhancementContext {
                partial_seed: seed.partial(),
                sequence_number,
                resonance_value: reading.resonance,
                pattern_label: reading.pattern.label().to_string(),
            },
        }
    }
}

/// Handle to a configured enhancer executable
#[derive(Debug, Clone)]
pub struct Enhancer {
    command: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl Enhancer {
    /// Create an enhancer for a command
    pub fn new(command: PathBuf, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command,
            args,
            timeout,
        }
    }

    /// Build from settings; `None` when disabled or no command is set
    pub fn from_settings(settings: &EnhancerSettings) -> Option<Self> {
        if !settings.enabled {
            return None;
        }
        let command = settings.command.clone()?;
        Some(Self::new(
            command,
            settings.args.clone(),
            Duration::from_millis(settings.timeout_ms),
        ))
    }

    /// One-time capability check: does the executable exist
    pub fn probe(&self) -> bool {
        let available = self.command.is_file();
        debug!(command = %self.command.display(), available, "probed enhancer");
        available
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask for an enhancement, giving up after the timeout
    pub async fn enhance(&self, request: &EnhancementRequest) -> Option<Enhancement> {
        match tokio::time::timeout(self.timeout, self.run(request)).await {
            Ok(Ok(enhancement)) => Some(enhancement),
            Ok(Err(reason)) => {
                warn!(%reason, "enhancer failed; using plain reading");
                None
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "enhancer timed out; using plain reading");
                None
            }
        }
    }

    async fn run(&self, request: &EnhancementRequest) -> Result<Enhancement, String> {
        let payload = serde_json::to_vec(request).map_err(|e| format!("encode request: {e}"))?;

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("spawn {}: {e}", self.command.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| format!("write stdin: {e}"))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| format!("wait: {e}"))?;

        if !output.status.success() {
            return Err(format!("exited with {}", output.status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Err("no response".into());
        }

        let enhancement: Enhancement =
            serde_json::from_str(stdout).map_err(|e| format!("decode response: {e}"))?;

        if !enhancement.is_well_formed() {
            return Err("scores out of range".into());
        }

        Ok(enhancement)
    }
}

/// Attach an enhancement to a reading when the enhancer is available
///
/// The core fields are never touched.
pub async fn enhance_reading(
    mut reading: Reading,
    query: &str,
    seed: &Seed,
    sequence_number: u32,
    enhancer: Option<&Enhancer>,
    enhancer_available: bool,
) -> Reading {
    if !enhancer_available {
        return reading;
    }
    let Some(enhancer) = enhancer else {
        return reading;
    };

    let request = EnhancementRequest::for_reading(query, seed, sequence_number, &reading);
    reading.enhancement = enhancer.enhance(&request).await;
    reading
}
