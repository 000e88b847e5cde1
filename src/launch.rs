//! Optional startup hook that opens the app in the system browser once the
//! server accepts connections.

use std::net::SocketAddr;
use std::process::{Command, Stdio};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Wait until `addr` accepts TCP connections or `timeout` passes.
/// Returns whether the server came up in time.
pub async fn wait_until_ready(addr: SocketAddr, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        sleep(POLL_INTERVAL).await;
    }
    false
}

/// Spawn a background task that opens `url` once `addr` is ready.
/// The browser is opened after the timeout even if the server never answered.
pub fn spawn_open_browser(
    url: String,
    addr: SocketAddr,
    timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(url = %url, timeout_secs = timeout.as_secs(), "Waiting for server before opening browser");
        if wait_until_ready(addr, timeout).await {
            info!(url = %url, "Server ready, opening browser");
        } else {
            info!(url = %url, "Timed out waiting for server, opening browser anyway");
        }
        if let Err(e) = open_browser(&url) {
            warn!(url = %url, error = %e, "Failed to open browser");
        }
    })
}

fn open_browser(url: &str) -> std::io::Result<()> {
    browser_command(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_when_listening() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        assert!(wait_until_ready(addr, Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_times_out_when_nothing_listens() {
        // Bind then drop to get a port that is very likely closed
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let started = std::time::Instant::now();
        assert!(!wait_until_ready(addr, Duration::from_millis(300)).await);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
