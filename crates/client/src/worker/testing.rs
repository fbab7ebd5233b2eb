//! Test doubles shared by the worker tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use pwa_core::{CacheDb, Destination, Error, PartitionNames, ProxyRequest, ProxyResponse};
use url::Url;

use super::{Worker, WorkerConfig, WorkerEvent};
use crate::fetch::Network;

/// Network that answers from a URL table and is offline for everything else.
#[derive(Default)]
pub(crate) struct StubNetwork {
    responses: Mutex<HashMap<String, ProxyResponse>>,
    calls: AtomicUsize,
}

impl StubNetwork {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, url: &str, response: ProxyResponse) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }

    pub(crate) fn go_offline(&self) {
        self.responses.lock().unwrap().clear();
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("offline: {}", request.url)))
    }
}

pub(crate) fn scope() -> Url {
    Url::parse("https://app.test/").unwrap()
}

/// Config for `https://app.test/` with an empty manifest.
pub(crate) fn test_config(version: &str) -> WorkerConfig {
    WorkerConfig {
        scope: scope(),
        partitions: PartitionNames::for_version(version),
        precache: Vec::new(),
        fallback_document: scope().join("index.html").unwrap(),
    }
}

pub(crate) fn request(path: &str, destination: Destination) -> ProxyRequest {
    ProxyRequest::get(scope().join(path).unwrap()).with_destination(destination)
}

/// A "v1" worker that has installed an empty manifest and activated.
pub(crate) async fn active_worker(network: Arc<StubNetwork>) -> Worker {
    let db = CacheDb::open_in_memory().await.unwrap();
    let worker = Worker::new(test_config("v1"), db, network);
    worker.dispatch(WorkerEvent::Install).await.unwrap();
    worker.dispatch(WorkerEvent::Activate).await.unwrap();
    worker
}

/// A worker whose partitions live in a database file under a temporary directory.
///
/// Keep the returned directory alive for as long as the worker is used.
pub(crate) async fn file_backed_worker(network: Arc<StubNetwork>, config: WorkerConfig) -> (Worker, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = CacheDb::open(db_path(&dir)).await.unwrap();
    (Worker::new(config, db, network), dir)
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("partitions.sqlite")
}

/// Drop the entries table from a second connection: every entry read, entry
/// write and partition deletion fails from then on, while partitions stay listable.
pub(crate) async fn break_entries(dir: &TempDir) {
    let conn = tokio_rusqlite::Connection::open(db_path(dir)).await.unwrap();
    conn.call(|c| c.execute_batch("DROP TABLE entries")).await.unwrap();
}
