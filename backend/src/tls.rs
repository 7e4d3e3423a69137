//! Optional TLS termination.
//!
//! The server is served through `axum-server` with a [`RustlsConfig`] built
//! from PEM files. A file watcher reloads the certificate when either file is
//! rewritten, so renewed certificates are picked up without a restart.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::config::TlsPaths;

/// Quiet period after a change before reloading, so a cert and key written
/// back to back trigger a single reload.
const RELOAD_DEBOUNCE: Duration = Duration::from_secs(2);

/// Load the TLS configuration from the configured PEM files.
pub async fn load_rustls_config(paths: &TlsPaths) -> anyhow::Result<RustlsConfig> {
    // rustls cannot pick a provider on its own when more than one is linked in.
    // Err means one is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    info!(
        "Loading TLS certificate from {} (key: {})",
        paths.cert_path.display(),
        paths.key_path.display()
    );

    let config = RustlsConfig::from_pem_file(&paths.cert_path, &paths.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load TLS config: {}", e))?;

    Ok(config)
}

/// Watch the certificate and key files and reload `config` when they change.
///
/// The watcher runs on its own OS thread for the lifetime of the process.
pub fn spawn_cert_watcher(paths: &TlsPaths, config: RustlsConfig) -> anyhow::Result<()> {
    let watched = WatchedFiles::resolve(paths)?;
    let rt = tokio::runtime::Handle::current();

    info!(
        "Watching TLS files for changes: cert={}, key={}",
        watched.cert.display(),
        watched.key.display()
    );

    std::thread::Builder::new()
        .name("tls-watcher".to_string())
        .spawn(move || {
            if let Err(e) = watched.run(config, rt) {
                error!("TLS certificate watcher stopped: {}", e);
            }
        })?;

    Ok(())
}

/// Canonical paths of the files being watched.
struct WatchedFiles {
    cert: PathBuf,
    key: PathBuf,
}

impl WatchedFiles {
    fn resolve(paths: &TlsPaths) -> anyhow::Result<Self> {
        // notify reports absolute paths
        let canonical = |p: &Path| {
            std::fs::canonicalize(p)
                .map_err(|e| anyhow::anyhow!("Cannot resolve {}: {}", p.display(), e))
        };
        Ok(Self {
            cert: canonical(&paths.cert_path)?,
            key: canonical(&paths.key_path)?,
        })
    }

    /// Directories to watch. Editors and certbot replace files, so the parent
    /// directory is watched rather than the file itself.
    fn directories(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut dirs = Vec::with_capacity(2);
        for file in [&self.cert, &self.key] {
            let dir = file
                .parent()
                .ok_or_else(|| anyhow::anyhow!("{} has no parent directory", file.display()))?
                .to_path_buf();
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        Ok(dirs)
    }

    fn is_relevant(&self, event: &Event) -> bool {
        matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
            && event.paths.iter().any(|p| *p == self.cert || *p == self.key)
    }

    fn run(self, config: RustlsConfig, rt: tokio::runtime::Handle) -> anyhow::Result<()> {
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();

        let mut watcher = notify::recommended_watcher(tx)?;
        for dir in self.directories()? {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        }

        loop {
            match rx.recv() {
                Ok(Ok(event)) if self.is_relevant(&event) => {
                    debug!("TLS file change detected: {:?}", event.paths);

                    std::thread::sleep(RELOAD_DEBOUNCE);
                    while rx.try_recv().is_ok() {}

                    let cert = self.cert.clone();
                    let key = self.key.clone();
                    let config = config.clone();
                    rt.spawn(async move {
                        match config.reload_from_pem_file(&cert, &key).await {
                            Ok(()) => info!("TLS certificate reloaded"),
                            Err(e) => warn!(
                                "Failed to reload TLS certificate (keeping old config): {}",
                                e
                            ),
                        }
                    });
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("File watcher error: {}", e),
                Err(_) => break,
            }
        }

        Ok(())
    }
}
