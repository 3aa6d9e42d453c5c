//! Remote command socket (§6): accepts line-delimited JSON envelopes and
//! translates them into the only two effects the orchestrator's main loop
//! permits from a helper thread — setting `reload_requested` or writing a
//! new config file. Never touches live objects directly.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::shutdown::ShutdownManager;

#[derive(Debug, Deserialize)]
struct CommandEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Runs until the socket is closed or the process is shutting down. Spawn
/// this as its own task; it must never block the main tick loop.
pub async fn run(
    listener: TcpListener,
    config_path: PathBuf,
    shutdown: Arc<ShutdownManager>,
) -> std::io::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!(%peer, "command connection accepted");
        let config_path = config_path.clone();
        let shutdown_clone = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, &config_path, &shutdown_clone).await {
                warn!(error = %e, "command connection ended with error");
            }
        });
        if !shutdown.is_running() {
            return Ok(());
        }
    }
}

async fn handle_connection(
    socket: tokio::net::TcpStream,
    config_path: &PathBuf,
    shutdown: &ShutdownManager,
) -> std::io::Result<()> {
    let (read_half, mut write_half) = socket.into_split();
    let mut lines = BufReader::new(read_half).lines();
    while let Some(line) = lines.next_line().await? {
        let ack = match serde_json::from_str::<CommandEnvelope>(&line) {
            Ok(envelope) => apply_command(envelope, config_path, shutdown).await,
            Err(e) => {
                warn!(error = %e, "malformed command envelope, ignoring");
                "ERR"
            }
        };
        write_half.write_all(format!("{ack}\n").as_bytes()).await?;
    }
    Ok(())
}

async fn apply_command(envelope: CommandEnvelope, config_path: &PathBuf, shutdown: &ShutdownManager) -> &'static str {
    match envelope.kind.as_str() {
        "APPLY_CONFIG" => {
            match serde_json::to_vec_pretty(&envelope.payload) {
                Ok(bytes) => match tokio::fs::write(config_path, bytes).await {
                    Ok(()) => {
                        shutdown.request_reload();
                        "OK"
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to write applied config");
                        "ERR"
                    }
                },
                Err(e) => {
                    warn!(error = %e, "failed to serialize APPLY_CONFIG payload");
                    "ERR"
                }
            }
        }
        "RESTART" => {
            warn!("RESTART command received; re-exec is the caller's responsibility");
            "OK"
        }
        "FETCH_ASSETS" => {
            shutdown.request_reload();
            "OK"
        }
        "PING" => "OK",
        other => {
            warn!(kind = other, "unknown command type, ignoring");
            "ERR"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn ping_acks_ok_and_unknown_type_acks_err() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(ShutdownManager::new());
        let config_path = PathBuf::from("/tmp/does-not-matter.json");

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let _ = handle_connection(socket, &config_path, &shutdown).await;
        });

        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client.write_all(b"{\"type\":\"PING\"}\n").await.unwrap();
        client.write_all(b"{\"type\":\"BOGUS\"}\n").await.unwrap();

        let mut buf = [0u8; 16];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"OK\n");
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ERR\n");

        drop(client);
        let _ = server.await;
    }
}
