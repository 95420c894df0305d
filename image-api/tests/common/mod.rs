//! Shared test utilities for image-api integration tests.

use image_api::Settings;
use image_api::config::{CrictlConfig, HarborConfig};
use image_api::rest::{AppState, create_router};
use reqwest::{Client, Response as ReqwestResponse};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// crictl stand-in printing a fixed image list.
pub fn fake_crictl(lines: &[&str]) -> CrictlConfig {
    let mut script = String::from("printf 'IMAGE TAG IMAGE ID SIZE\\n");
    for line in lines {
        script.push_str(line);
        script.push_str("\\n");
    }
    script.push('\'');

    CrictlConfig {
        ignore_file_path: "/nonexistent/images_to_ignore.txt".to_string(),
        command: vec!["sh".into(), "-c".into(), script],
        timeout_secs: 5,
    }
}

/// crictl stand-in that exits nonzero.
pub fn failing_crictl(stderr: &str) -> CrictlConfig {
    CrictlConfig {
        command: vec![
            "sh".into(),
            "-c".into(),
            format!("echo '{}' >&2; exit 1", stderr),
        ],
        ..fake_crictl(&[])
    }
}

pub fn harbor_config(url: &str) -> HarborConfig {
    HarborConfig {
        url: url.to_string(),
        user: "admin".into(),
        password: "Harbor12345".into(),
        page_size: 2,
        timeout_secs: 5,
        ..Default::default()
    }
}

/// Test server running the REST router on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    pub async fn spawn(settings: Settings) -> Self {
        let app_state = Arc::new(AppState::new(Arc::new(settings)));
        let router = create_router(app_state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            addr,
            client: Client::new(),
            shutdown_tx,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn get(&self, path: &str) -> ReqwestResponse {
        self.client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}
