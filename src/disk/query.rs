//! External system query execution
//!
//! Every query is a child process with a hard timeout. A query that hangs
//! is killed and reported as [`QueryError::Timeout`].

use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

const DEFAULT_PROGRAM: &str = "wmic";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Query errors. Callers in the disk pipeline recover from all of them.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[error("{label} timed out after {secs}s")]
    Timeout { label: String, secs: u64 },

    #[error("{label} exited with {status}")]
    Failed {
        label: String,
        status: std::process::ExitStatus,
    },

    #[error("Failed while waiting on {label}: {source}")]
    Wait {
        label: String,
        source: std::io::Error,
    },
}

/// How system queries are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Query tool executable (`wmic` unless overridden).
    pub program: String,
    /// Upper bound for each individual query.
    pub timeout: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Run `program args...` and return its decoded stdout.
pub async fn run_query(
    program: &str,
    args: &[&str],
    label: &str,
    timeout: Duration,
) -> Result<String, QueryError> {
    let mut command = Command::new(program);
    command
        .args(args)
        // wmic waits on stdin when it is inherited from a console
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(target_os = "windows")]
    command.creation_flags(windows_sys::Win32::System::Threading::CREATE_NO_WINDOW);

    let child = command.spawn().map_err(|source| QueryError::Launch {
        program: program.to_string(),
        source,
    })?;

    // Dropping the pending future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| QueryError::Wait {
            label: label.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(QueryError::Timeout {
                label: label.to_string(),
                secs: timeout.as_secs(),
            })
        }
    };

    if !output.status.success() {
        let stderr = decode_output(&output.stderr);
        tracing::debug!(label, stderr = %stderr.trim(), "query failed");
        return Err(QueryError::Failed {
            label: label.to_string(),
            status: output.status,
        });
    }

    Ok(decode_output(&output.stdout))
}

/// Decode console output that may be UTF-16LE (wmic does this when piped on
/// some locales) or UTF-8/ANSI.
pub fn decode_output(bytes: &[u8]) -> String {
    let utf16_body = match bytes {
        [0xFF, 0xFE, rest @ ..] => Some(rest),
        [_, 0, ..] => Some(bytes),
        _ => None,
    };

    match utf16_body {
        Some(body) => {
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}
