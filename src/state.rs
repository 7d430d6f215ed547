use std::sync::Arc;
use std::time::Duration;

use crate::application::gateway::Gateway;
use crate::domain::repositories::UrlStore;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    /// Used directly only by the health check; requests go through the gateway.
    pub store: Arc<dyn UrlStore>,
    pub base_url: String,
    pub request_timeout: Duration,
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        gateway: Arc<Gateway>,
        store: Arc<dyn UrlStore>,
        base_url: impl Into<String>,
        request_timeout: Duration,
        behind_proxy: bool,
    ) -> Self {
        Self {
            gateway,
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
            behind_proxy,
        }
    }

    /// Public URL for `short_code`.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url, short_code)
    }

    /// Deadline for a request starting now.
    pub fn deadline(&self) -> tokio::time::Instant {
        tokio::time::Instant::now() + self.request_timeout
    }
}
