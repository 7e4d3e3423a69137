//! Application state shared by all request handlers.

use crate::version::{BuildVersionService, VersionService};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Provider of the version reported by the API
    version_service: Arc<dyn VersionService>,
}

impl AppState {
    /// Create new application state with the given version service.
    pub fn new(version_service: impl VersionService + 'static) -> Self {
        Self::with_version_service(Arc::new(version_service))
    }

    /// Create new application state sharing an existing version service.
    pub fn with_version_service(version_service: Arc<dyn VersionService>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { version_service }),
        }
    }

    /// Get the version service.
    pub fn version_service(&self) -> &dyn VersionService {
        self.inner.version_service.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(BuildVersionService::new())
    }
}
