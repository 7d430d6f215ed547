mod common;

use linkpool::error::ServiceError;
use linkpool::infrastructure::persistence::MemoryUrlStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

#[tokio::test]
async fn test_shorten_resolve_scenario() {
    let (state, _store) = common::memory_state();
    let gateway = &state.gateway;

    let c1 = gateway
        .shorten("client", "https://example.com/a", deadline())
        .await
        .unwrap();
    assert_eq!(
        gateway.resolve("client", &c1, deadline()).await.unwrap(),
        "https://example.com/a"
    );
    assert_eq!(
        gateway.resolve("client", "doesnotexist", deadline()).await,
        Err(ServiceError::NotFound)
    );
    assert_eq!(
        gateway
            .shorten("client", "https://example.com/a", deadline())
            .await
            .unwrap(),
        c1
    );

    gateway.pool().stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_shortens_of_one_url_agree() {
    let (state, store) = common::memory_state();

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let gateway = Arc::clone(&state.gateway);
            tokio::spawn(async move {
                gateway
                    .shorten(&format!("client-{i}"), "https://example.com/same", deadline())
                    .await
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        codes.insert(handle.await.unwrap().unwrap());
    }

    assert_eq!(codes.len(), 1);
    assert_eq!(store.len(), 1);

    state.gateway.pool().stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_distinct_urls_get_unique_codes() {
    let (state, store) = common::memory_state();

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let gateway = Arc::clone(&state.gateway);
            tokio::spawn(async move {
                let url = format!("https://example.com/page/{i}");
                let code = gateway.shorten("client", &url, deadline()).await.unwrap();
                (url, code)
            })
        })
        .collect();

    let mut pairs = Vec::new();
    for handle in handles {
        pairs.push(handle.await.unwrap());
    }

    let codes: HashSet<_> = pairs.iter().map(|(_, code)| code.clone()).collect();
    assert_eq!(codes.len(), 200);
    assert_eq!(store.len(), 200);

    for (url, code) in pairs {
        assert_eq!(
            state.gateway.resolve("client", &code, deadline()).await.unwrap(),
            url
        );
    }

    state.gateway.pool().stop().await;
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let state = common::create_test_state(
        Arc::new(MemoryUrlStore::new()),
        common::TestOptions {
            burst: 2,
            ..Default::default()
        },
    );
    let gateway = &state.gateway;

    for _ in 0..2 {
        assert_eq!(
            gateway.resolve("10.0.0.1", "missing1", deadline()).await,
            Err(ServiceError::NotFound)
        );
    }
    assert_eq!(
        gateway.resolve("10.0.0.1", "missing1", deadline()).await,
        Err(ServiceError::RateLimited)
    );
    assert_eq!(
        gateway.resolve("10.0.0.2", "missing1", deadline()).await,
        Err(ServiceError::NotFound)
    );

    gateway.pool().stop().await;
}

#[tokio::test]
async fn test_requests_after_stop_are_refused() {
    let (state, _store) = common::memory_state();
    state.gateway.pool().stop().await;

    assert_eq!(
        state
            .gateway
            .shorten("client", "https://example.com", deadline())
            .await,
        Err(ServiceError::ShuttingDown)
    );
}
