//! One e2e run: mock Gemini, a scratch directory holding the generated
//! proxy config and its mounted-style secret, and the proxy process.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::{Child, Command};

use crate::backend::{self, MockGemini};

/// Secret name the proxy is configured to read
pub const SECRET_NAME: &str = "GEMINI_API_KEY";

/// Provider timeout written into the proxy config
pub const PROVIDER_TIMEOUT_SECS: u64 = 2;

/// The file the proxy reads its API key from on every request
#[derive(Debug, Clone)]
pub struct SecretFile {
    path: PathBuf,
}

impl SecretFile {
    pub fn write(&self, key: &str) -> anyhow::Result<()> {
        std::fs::write(&self.path, key)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", self.path.display(), e))
    }

    /// Unmount the secret; a missing file is already the goal state
    pub fn remove(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Failed to remove {}: {}", self.path.display(), e)),
        }
    }
}

pub struct Harness {
    pub mock: MockGemini,
    pub secret: SecretFile,
    pub proxy_addr: SocketAddr,
    proxy: Child,
    // Dropped last: the proxy must be gone before its config and secret are
    _scratch: TempDir,
}

impl Harness {
    /// Start the mock, write config and secret dir, spawn the proxy and wait
    /// for `/health`
    pub async fn start(proxy_bin: &Path, proxy_logs: bool) -> anyhow::Result<Self> {
        let mock = backend::start().await?;
        println!("Mock Gemini on {}", mock.addr);

        let scratch = tempfile::Builder::new().prefix("prompt-proxy-e2e").tempdir()?;
        let secrets_dir = scratch.path().join("secrets");
        std::fs::create_dir_all(&secrets_dir)?;

        let proxy_addr = free_local_addr()?;
        let config_path = scratch.path().join("proxy.yaml");
        std::fs::write(&config_path, proxy_config(proxy_addr, &mock, &secrets_dir))?;

        let mut command = Command::new(proxy_bin);
        command
            .arg("run")
            .arg("--config")
            .arg(&config_path)
            .kill_on_drop(true);
        if !proxy_logs {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        println!("Spawning {} on {}", proxy_bin.display(), proxy_addr);
        let proxy = command
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to spawn '{}': {}", proxy_bin.display(), e))?;

        let mut harness = Self {
            mock,
            secret: SecretFile {
                path: secrets_dir.join(SECRET_NAME),
            },
            proxy_addr,
            proxy,
            _scratch: scratch,
        };
        harness.wait_until_healthy().await?;
        Ok(harness)
    }

    async fn wait_until_healthy(&mut self) -> anyhow::Result<()> {
        let client = reqwest::Client::new();
        let health_url = format!("http://{}/health", self.proxy_addr);

        for _ in 0..50 {
            if let Some(status) = self.proxy.try_wait()? {
                anyhow::bail!("Proxy exited before becoming healthy ({}); rerun with --proxy-logs", status);
            }
            if let Ok(resp) = client.get(&health_url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Proxy not healthy at {} after 5s", health_url)
    }

    pub async fn shutdown(mut self) {
        self.proxy.kill().await.ok();
    }
}

/// Reserve a port by binding and releasing it
fn free_local_addr() -> anyhow::Result<SocketAddr> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?)
}

fn proxy_config(proxy_addr: SocketAddr, mock: &MockGemini, secrets_dir: &Path) -> String {
    format!(
        "server:\n  host: \"{host}\"\n  port: {port}\n\
         provider:\n  base_url: \"{base_url}\"\n  model: \"gemini-2.0-flash\"\n  timeout_seconds: {timeout}\n\
         credentials:\n  secret_name: \"{secret}\"\n  source: \"file\"\n  dir: \"{dir}\"\n",
        host = proxy_addr.ip(),
        port = proxy_addr.port(),
        base_url = mock.base_url(),
        timeout = PROVIDER_TIMEOUT_SECS,
        secret = SECRET_NAME,
        dir = secrets_dir.display(),
    )
}
