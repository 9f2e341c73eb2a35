use std::{
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use axum::Router;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::services::{ServeDir, ServeFile};

use crate::{error::ShellError, WEB_ROOT_ENTRY_FILE};

pub fn loopback_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
}

pub fn local_origin_url(port: u16) -> String {
    format!("http://{}:{}/", Ipv4Addr::LOCALHOST, port)
}

/// Serves files under `web_root`; every unmatched path gets the entry document
/// with a 200 so client-side routing can take over.
pub fn spa_router(web_root: &Path) -> Router {
    let entry_document = ServeFile::new(web_root.join(WEB_ROOT_ENTRY_FILE));
    let assets = ServeDir::new(web_root)
        .append_index_html_on_directories(true)
        .fallback(entry_document);

    Router::new().fallback_service(assets)
}

/// A running loopback server. Dropping the handle stops it.
#[derive(Debug)]
pub struct StaticServerHandle {
    local_addr: SocketAddr,
    web_root: PathBuf,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StaticServerHandle {
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn web_root(&self) -> &Path {
        &self.web_root
    }

    pub fn origin_url(&self) -> String {
        local_origin_url(self.port())
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
            && self
                .task
                .as_ref()
                .is_some_and(|task| !task.is_finished())
    }

    /// Signals the server to stop accepting connections.
    ///
    /// Best-effort and non-blocking: repeated calls are no-ops and nothing is
    /// propagated. Returns `true` only for the call that actually stopped it.
    pub fn stop(&mut self) -> bool {
        let Some(shutdown_tx) = self.shutdown_tx.take() else {
            return false;
        };

        if shutdown_tx.send(()).is_err() {
            // The serve task is already gone; make sure nothing is left behind.
            if let Some(task) = self.task.take() {
                task.abort();
            }
        }
        true
    }
}

impl Drop for StaticServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Binds `127.0.0.1:0` and starts serving `web_root`.
///
/// Resolves once the socket is listening, so the returned port is usable
/// immediately. Must run inside a tokio runtime.
pub async fn start_static_server<F>(web_root: PathBuf, log: F) -> Result<StaticServerHandle, ShellError>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    let bind_addr = loopback_bind_addr();
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ShellError::Bind {
            addr: bind_addr,
            source,
        })?;
    let local_addr = listener.local_addr().map_err(|source| ShellError::Bind {
        addr: bind_addr,
        source,
    })?;

    let router = spa_router(&web_root);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
        match served {
            Ok(()) => log(&format!("local web server on {local_addr} stopped")),
            Err(error) => log(&format!("local web server on {local_addr} failed: {error}")),
        }
    });

    Ok(StaticServerHandle {
        local_addr,
        web_root,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}
