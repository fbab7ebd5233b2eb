//! Fixtures shared by the tool tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pwa_client::{Network, Worker, WorkerConfig, WorkerEvent};
use pwa_core::{CacheDb, Error, PartitionNames, ProxyRequest, ProxyResponse};
use rmcp::model::CallToolResult;
use url::Url;

/// Network answering from a URL table; unknown URLs fail as offline.
#[derive(Default)]
pub(crate) struct TableNetwork {
    responses: Mutex<HashMap<String, ProxyResponse>>,
}

impl TableNetwork {
    pub(crate) fn respond(&self, url: &str, response: ProxyResponse) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }
}

#[async_trait]
impl Network for TableNetwork {
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse, Error> {
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

/// An installed and activated "v1" worker with `index.html` pre-cached.
pub(crate) async fn active_worker(network: Arc<TableNetwork>) -> Arc<Worker> {
    let index = scope().join("index.html").unwrap();
    network.respond(
        index.as_str(),
        ProxyResponse::with_content_type(200, "text/html", "<h1>cached shell</h1>"),
    );
    let config = WorkerConfig {
        scope: scope(),
        partitions: PartitionNames::for_version("v1"),
        precache: vec![index.clone()],
        fallback_document: index,
    };
    let db = CacheDb::open_in_memory().await.unwrap();
    let worker = Worker::new(config, db, network);
    worker.dispatch(WorkerEvent::Install).await.unwrap();
    worker.dispatch(WorkerEvent::Activate).await.unwrap();
    Arc::new(worker)
}

/// Parse the JSON text content of a tool result.
pub(crate) fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
