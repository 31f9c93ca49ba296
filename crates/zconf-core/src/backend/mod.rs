//! Discovery backends wrapping the platform mDNS command-line tools.
//!
//! All protocol work is delegated to the native tools; a backend only
//! builds command lines, bounds how long a tool may talk, and parses the
//! text that came back. Everything above this module depends on the
//! [`DiscoveryBackend`] capability, never on a concrete tool family.

pub mod avahi;
pub mod dnssd;

pub use avahi::AvahiBackend;
pub use dnssd::DnsSdBackend;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;

use crate::error::{BackendError, CoreError};
use crate::service::{ServiceIdentity, ServiceRecord};

/// How long to keep draining a pipe after the capture window closed.
const DRAIN_WAIT: Duration = Duration::from_millis(100);

/// Grace period for a tool to exit after closing its stdout.
const EXIT_WAIT: Duration = Duration::from_millis(100);

/// IP family kept when a tool reports records for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFamily {
    #[default]
    V4,
    V6,
}

/// Caller overrides for backend timing and filtering defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendOptions {
    /// Bound on one browse invocation
    pub browse_wait: Option<Duration>,
    /// Bound on one hostname resolution
    pub resolve_wait: Option<Duration>,
    /// IP family filter where the tool reports both
    pub address_family: Option<AddressFamily>,
}

/// Capability interface over the two native tool families.
#[async_trait]
pub trait DiscoveryBackend: Send + Sync {
    /// Tool family name for logs and errors.
    fn name(&self) -> &'static str;

    /// Run one bounded browse and return every resolved record, in tool
    /// output order. `None` as the type means "all services" where the
    /// tool has such a mode. Unparseable lines are skipped, a timeout
    /// yields whatever was captured, and no matches is an empty vec.
    async fn browse(
        &self,
        service_type: Option<&str>,
        domain: &str,
    ) -> Result<Vec<(ServiceIdentity, ServiceRecord)>, CoreError>;

    /// Spawn the long-lived publish process for one advertisement. The
    /// advertisement stays on the network exactly as long as the returned
    /// child runs.
    fn spawn_publisher(&self, name: &str, service_type: &str, port: u16)
        -> Result<Child, CoreError>;

    /// Best-effort hostname resolution; empty string on any failure.
    async fn resolve_address(&self, hostname: &str) -> String;
}

/// Pick the native backend for the current platform with default options.
///
/// Fails when the required tools are not on PATH.
pub fn default_backend() -> Result<Arc<dyn DiscoveryBackend>, CoreError> {
    default_backend_with(&BackendOptions::default())
}

/// Pick the native backend for the current platform.
///
/// Linux gets the avahi tool family; everything else (Windows, macOS)
/// gets `dns-sd`.
pub fn default_backend_with(
    options: &BackendOptions,
) -> Result<Arc<dyn DiscoveryBackend>, CoreError> {
    #[cfg(target_os = "linux")]
    {
        Ok(Arc::new(AvahiBackend::new_with(options)?))
    }
    #[cfg(not(target_os = "linux"))]
    {
        Ok(Arc::new(DnsSdBackend::new_with(options)?))
    }
}

/// Locate a required tool on PATH, failing with `ToolMissing` when absent.
pub(crate) fn require_tool(name: &str) -> Result<PathBuf, CoreError> {
    which::which(name).map_err(|_| {
        BackendError::ToolMissing {
            tool: name.to_string(),
        }
        .into()
    })
}

/// Run a tool with stdout piped and collect its output.
///
/// Reads until the tool closes stdout or the window elapses, whichever
/// comes first; on expiry the process is killed and the pipe drained. A
/// tool still running after closing its stdout gets a short grace and is
/// then killed too. The captured text (possibly partial) is always
/// returned. A timeout means "no more output", not an error.
pub(crate) async fn capture_output(
    bin: &Path,
    args: &[&str],
    window: Duration,
) -> Result<String, CoreError> {
    tracing::debug!(tool = %bin.display(), ?args, "spawning capture");

    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| BackendError::Spawn {
            tool: bin.display().to_string(),
            source,
        })?;

    let mut buf = Vec::new();
    if let Some(mut stdout) = child.stdout.take() {
        match timeout(window, stdout.read_to_end(&mut buf)).await {
            Ok(Ok(_)) => {
                // Stdout closing does not mean the tool exited.
                if timeout(EXIT_WAIT, child.wait()).await.is_err() {
                    tracing::debug!(tool = %bin.display(), "tool outlived its stdout, terminating");
                    let _ = child.kill().await;
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(tool = %bin.display(), error = %e, "capture read failed");
                let _ = child.kill().await;
            }
            Err(_) => {
                tracing::debug!(tool = %bin.display(), "capture window elapsed, terminating");
                let _ = child.kill().await;
                // The kill closes the pipe; pick up what was still buffered.
                let _ = timeout(DRAIN_WAIT, stdout.read_to_end(&mut buf)).await;
            }
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Spawn a long-lived publish process with its streams captured but not
/// consumed, killed automatically if the handle is dropped.
pub(crate) fn spawn_publisher_process(bin: &Path, args: &[&str]) -> Result<Child, CoreError> {
    tracing::debug!(tool = %bin.display(), ?args, "spawning publisher");

    let child = Command::new(bin)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| BackendError::Spawn {
            tool: bin.display().to_string(),
            source,
        })?;

    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_reads_until_tool_exits() {
        let out = capture_output(Path::new("echo"), &["hello", "world"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.trim(), "hello world");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_window_bounds_a_silent_tool() {
        let start = std::time::Instant::now();
        let out = capture_output(Path::new("sleep"), &["5"], Duration::from_millis(200))
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_bounds_a_tool_that_outlives_its_stdout() {
        let start = std::time::Instant::now();
        let out = capture_output(
            Path::new("sh"),
            &["-c", "echo early; exec 1>&-; sleep 30"],
            Duration::from_millis(300),
        )
        .await
        .unwrap();
        assert_eq!(out.trim(), "early");
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_capture_missing_tool_is_spawn_error() {
        let err = capture_output(
            Path::new("zconf-no-such-tool"),
            &[],
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Backend(BackendError::Spawn { .. })
        ));
    }
}
