//! Test utilities for building an in-process server over the real router.

use crate::config::{Config, StorageConfig};
use crate::storage::memory::InMemoryObjectStore;
use crate::{AppState, build_router};
use axum_test::TestServer;
use std::sync::Arc;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        bucket_name: "test-bucket".to_string(),
        storage: StorageConfig::Memory,
        ..Default::default()
    }
}

pub fn create_test_server(store: Arc<InMemoryObjectStore>) -> TestServer {
    create_test_server_with_config(create_test_config(), store)
}

pub fn create_test_server_with_config(config: Config, store: Arc<InMemoryObjectStore>) -> TestServer {
    let state = AppState::builder().config(config).store(store).build();
    TestServer::new(build_router(state)).expect("Failed to create test server")
}
