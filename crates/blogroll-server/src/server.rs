//! Startup and shutdown of the HTTP API.
//!
//! [`run_server`] hands back a [`RunningServer`] that owns both process-wide
//! resources, the database connection and the listening socket.  Dropping it
//! without calling [`RunningServer::close`] leaves the server running in the
//! background task.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use blogroll_store::Database;

use crate::api::{build_router, AppState};
use crate::config::{DatabaseLocation, ServerConfig};

/// Handle to a started server.
pub struct RunningServer {
    local_addr: SocketAddr,
    state: AppState,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// Open the database for `location`.
pub fn open_database(location: &DatabaseLocation) -> anyhow::Result<Database> {
    let db = match location {
        DatabaseLocation::Default => Database::new(),
        DatabaseLocation::InMemory => Database::open_in_memory(),
        DatabaseLocation::File(path) => Database::open_at(path),
    };
    db.with_context(|| format!("Failed to open database ({location:?})"))
}

/// Connect to the database, bind the listener and start serving.
///
/// If the listener cannot be bound the database is closed again before the
/// error is returned.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<RunningServer> {
    let db = open_database(&config.database)?;
    let addr = config.http_addr();

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            if let Err(close_err) = db.close() {
                tracing::warn!(error = %close_err, "Failed to close database after bind error");
            }
            return Err(e).with_context(|| format!("Failed to bind {addr}"));
        }
    };
    let local_addr = listener.local_addr()?;

    let state = AppState::new(db, config);
    let app = build_router(state.clone());
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                // A dropped sender also means "stop".
                let _ = shutdown_rx.await;
            })
            .await
    });

    info!(addr = %local_addr, "HTTP API server listening");

    Ok(RunningServer {
        local_addr,
        state,
        shutdown_tx,
        task,
    })
}

impl RunningServer {
    /// The address the listener is actually bound to (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Close the database connection, then stop the listener.
    ///
    /// Both steps are always attempted; the first failure is returned.
    pub async fn close(self) -> anyhow::Result<()> {
        let db_result = match self.state.take_database().await {
            Some(db) => db.close().context("Failed to close database"),
            None => Ok(()),
        };

        info!("Closing server");
        // The receiver is gone only if the server task already exited.
        let _ = self.shutdown_tx.send(());
        let serve_result = self.task.await;

        db_result?;
        serve_result
            .context("Server task panicked")?
            .context("HTTP server failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;

    async fn raw_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_start_serve_and_close() {
        let server = run_server(ServerConfig::ephemeral()).await.unwrap();
        let addr = server.local_addr();
        assert_ne!(addr.port(), 0);

        let response = raw_get(addr, "/blogposts").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains(r#"{"blogposts":[]}"#));

        server.close().await.unwrap();
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_file_database_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            database: DatabaseLocation::File(dir.path().join("blog.db")),
            ..ServerConfig::ephemeral()
        };

        let server = run_server(config.clone()).await.unwrap();
        server
            .state
            .with_db("Author", |db| {
                db.create_author(blogroll_store::NewAuthor {
                    first_name: "Ada".into(),
                    last_name: "Lovelace".into(),
                    user_name: "ada".into(),
                })
            })
            .await
            .unwrap();
        server.close().await.unwrap();

        let server = run_server(config).await.unwrap();
        let authors = server
            .state
            .with_db("Author", |db| db.list_authors())
            .await
            .unwrap();
        assert_eq!(authors.len(), 1);
        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ServerConfig {
            port: occupied.local_addr().unwrap().port(),
            ..ServerConfig::ephemeral()
        };

        assert!(run_server(config).await.is_err());
    }
}
