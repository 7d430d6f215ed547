#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use linkpool::application::gateway::Gateway;
use linkpool::application::rate_limiter::{ClientRateLimiter, RateLimitConfig};
use linkpool::application::services::UrlService;
use linkpool::application::worker_pool::{PoolConfig, WorkerPool};
use linkpool::domain::repositories::UrlStore;
use linkpool::infrastructure::persistence::MemoryUrlStore;
use linkpool::routes::api_router;
use linkpool::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

pub const BASE_URL: &str = "http://sho.rt";

pub struct TestOptions {
    pub burst: u32,
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub request_timeout: Duration,
    pub behind_proxy: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            burst: 1_000,
            worker_count: 5,
            queue_capacity: 100,
            request_timeout: Duration::from_secs(5),
            behind_proxy: false,
        }
    }
}

pub fn create_test_state(store: Arc<dyn UrlStore>, options: TestOptions) -> AppState {
    let service = Arc::new(UrlService::new(store.clone()));
    let pool = Arc::new(WorkerPool::start(
        PoolConfig {
            worker_count: options.worker_count,
            queue_capacity: options.queue_capacity,
        },
        service,
    ));
    let limiter = Arc::new(ClientRateLimiter::new(&RateLimitConfig {
        per_second: 1,
        burst: options.burst,
        idle_timeout: Duration::from_secs(300),
    }));

    AppState::new(
        Arc::new(Gateway::new(pool, limiter)),
        store,
        BASE_URL,
        options.request_timeout,
        options.behind_proxy,
    )
}

/// State over a fresh in-memory store, plus a handle to that store.
pub fn memory_state() -> (AppState, Arc<MemoryUrlStore>) {
    let store = Arc::new(MemoryUrlStore::new());
    (create_test_state(store.clone(), TestOptions::default()), store)
}

/// Full router, with every request appearing to come from 127.0.0.1.
pub fn test_server(state: AppState) -> TestServer {
    let app = api_router(state).layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
