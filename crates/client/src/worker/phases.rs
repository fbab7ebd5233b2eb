//! Install and activate phases.

use futures_util::future::try_join_all;
use pwa_core::{Error, ProxyRequest};

use super::{Trigger, Worker};

/// Result of removing partitions that do not belong to the current version.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

impl PruneReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Worker {
    /// Pre-cache the asset manifest into the static partition.
    ///
    /// All manifest URLs are fetched before anything is written, and the
    /// writes share one transaction: a single failure leaves no partial
    /// static partition and makes the worker redundant. On success the
    /// worker waits with skip-waiting requested.
    ///
    /// Returns the number of entries stored.
    pub async fn install(&self) -> Result<usize, Error> {
        self.lifecycle.write().await.begin_install()?;

        tracing::info!(
            partition = %self.config.partitions.static_name,
            assets = self.config.precache.len(),
            "installing worker"
        );

        match self.precache().await {
            Ok(cached) => {
                let mut lifecycle = self.lifecycle.write().await;
                lifecycle.apply(Trigger::InstallSucceeded)?;
                lifecycle.skip_waiting();
                tracing::info!(cached, "install complete");
                Ok(cached)
            }
            Err(e) => {
                tracing::error!("install failed: {e}");
                self.lifecycle.write().await.apply(Trigger::InstallFailed)?;
                Err(Error::InstallFailed(e.to_string()))
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let requests: Vec<ProxyRequest> = self.config.precache.iter().cloned().map(ProxyRequest::get).collect();

        let fetches = requests.into_iter().map(|request| async move {
            let response = self.network.fetch(&request).await?;
            if !response.ok() {
                return Err(Error::HttpError(format!("{} returned status {}", request.url, response.status)));
            }
            Ok((request, response))
        });
        let entries = try_join_all(fetches).await?;

        self.db
            .put_entries(&self.config.partitions.static_name, &entries)
            .await?;
        Ok(entries.len())
    }

    /// Remove stale partitions and take control of all clients.
    ///
    /// Cleanup failures are logged and do not block activation.
    /// Returns the names of the removed partitions.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        self.lifecycle.write().await.apply(Trigger::ActivateStarted)?;

        let report = self.prune_stale_partitions().await;
        if !report.is_clean() {
            tracing::warn!(failed = ?report.failed, "some stale partitions could not be removed");
        }

        self.lifecycle.write().await.apply(Trigger::ActivateFinished)?;
        tracing::info!(removed = report.removed.len(), "activation complete, clients claimed");
        Ok(report.removed)
    }

    /// Delete every partition other than the current static and dynamic ones.
    pub async fn prune_stale_partitions(&self) -> PruneReport {
        let mut report = PruneReport::default();

        let names = match self.db.partition_names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("could not list partitions: {e}");
                return report;
            }
        };

        for name in names.into_iter().filter(|n| !self.config.partitions.is_current(n)) {
            match self.db.delete_partition(&name).await {
                Ok(_) => {
                    tracing::info!(partition = %name, "deleted stale partition");
                    report.removed.push(name);
                }
                Err(e) => {
                    tracing::warn!(partition = %name, "failed to delete partition: {e}");
                    report.failed.push(name);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::{StubNetwork, break_entries, file_backed_worker, scope, test_config};
    use crate::worker::{EventOutcome, Lifecycle, LifecycleState, WorkerConfig, WorkerEvent};
    use pwa_core::{CacheDb, ProxyResponse};
    use std::sync::Arc;

    const MANIFEST: [&str; 4] = ["./", "./index.html", "./styles.css", "./icons/icon-192x192.png"];

    fn manifest_config(version: &str) -> WorkerConfig {
        WorkerConfig {
            precache: MANIFEST.iter().map(|p| scope().join(p).unwrap()).collect(),
            ..test_config(version)
        }
    }

    fn serve_manifest(network: &StubNetwork) {
        for path in MANIFEST {
            let url = scope().join(path).unwrap();
            network.respond(url.as_str(), ProxyResponse::new(200, vec![], format!("body of {path}")));
        }
    }

    async fn worker_with(network: Arc<StubNetwork>, config: WorkerConfig) -> Worker {
        let db = CacheDb::open_in_memory().await.unwrap();
        Worker::new(config, db, network)
    }

    #[tokio::test]
    async fn test_install_stores_every_manifest_url() {
        let network = StubNetwork::new();
        serve_manifest(&network);
        let worker = worker_with(network.clone(), manifest_config("v1")).await;

        let outcome = worker.dispatch(WorkerEvent::Install).await.unwrap();

        assert!(matches!(outcome, EventOutcome::Installed { cached: 4 }));
        let entries = worker.cache().list_entries("v1-static").await.unwrap();
        let mut urls: Vec<String> = entries.into_iter().map(|e| e.url).collect();
        urls.sort();
        let mut expected: Vec<String> = MANIFEST.iter().map(|p| scope().join(p).unwrap().to_string()).collect();
        expected.sort();
        assert_eq!(urls, expected);
        assert_eq!(network.calls(), 4);
        assert_eq!(worker.state().await, LifecycleState::Waiting);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let network = StubNetwork::new();
        serve_manifest(&network);
        network.respond("https://app.test/styles.css", ProxyResponse::new(500, vec![], "boom"));
        let worker = worker_with(network, manifest_config("v1")).await;

        let result = worker.dispatch(WorkerEvent::Install).await;

        assert!(matches!(result, Err(Error::InstallFailed(_))));
        assert!(!worker.cache().has_partition("v1-static").await.unwrap());
        assert_eq!(worker.state().await, LifecycleState::Redundant);
    }

    #[tokio::test]
    async fn test_install_offline_fails() {
        let network = StubNetwork::new();
        serve_manifest(&network);
        network.go_offline();
        let worker = worker_with(network, manifest_config("v1")).await;

        assert!(worker.install().await.is_err());
        assert_eq!(worker.cache().entry_count("v1-static").await.unwrap(), 0);

        let activation = worker.activate().await;
        assert!(matches!(activation, Err(Error::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_install_twice_rejected() {
        let network = StubNetwork::new();
        let worker = worker_with(network, test_config("v1")).await;
        worker.install().await.unwrap();

        assert!(matches!(worker.install().await, Err(Error::InvalidTransition { .. })));
        assert!(worker.cache().has_partition("v1-static").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_install_runs_once() {
        let network = StubNetwork::new();
        serve_manifest(&network);
        let worker = worker_with(network.clone(), manifest_config("v1")).await;

        let (first, second) = tokio::join!(worker.install(), worker.install());

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| matches!(r, Ok(4))).count(), 1);
        assert_eq!(results.iter().filter(|r| matches!(r, Err(Error::InvalidTransition { .. }))).count(), 1);
        assert_eq!(network.calls(), 4);
        assert_eq!(worker.cache().entry_count("v1-static").await.unwrap(), 4);
        assert_eq!(worker.state().await, LifecycleState::Waiting);
    }

    #[tokio::test]
    async fn test_activation_removes_previous_versions() {
        let network = StubNetwork::new();
        let worker = worker_with(network, test_config("v2")).await;
        for name in ["v1-static", "v1-dynamic", "v2-static", "v2-dynamic"] {
            worker.cache().open_partition(name).await.unwrap();
        }

        worker.install().await.unwrap();
        let outcome = worker.dispatch(WorkerEvent::Activate).await.unwrap();

        let EventOutcome::Activated { removed } = outcome else {
            panic!("expected activation");
        };
        assert_eq!(removed, vec!["v1-static".to_string(), "v1-dynamic".to_string()]);
        assert_eq!(worker.cache().partition_names().await.unwrap(), vec!["v2-static", "v2-dynamic"]);
        assert_eq!(worker.state().await, LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_install_forces_activation_past_incumbent() {
        let network = StubNetwork::new();
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::with_lifecycle(test_config("v2"), db, network, Lifecycle::replacing_incumbent());

        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        assert_eq!(worker.state().await, LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_prune_keeps_current_partitions() {
        let network = StubNetwork::new();
        let worker = worker_with(network, test_config("v1")).await;
        worker.cache().open_partition("v1-dynamic").await.unwrap();
        worker.cache().open_partition("legacy").await.unwrap();

        let report = worker.prune_stale_partitions().await;

        assert!(report.is_clean());
        assert_eq!(report.removed, vec!["legacy".to_string()]);
        assert_eq!(worker.cache().partition_names().await.unwrap(), vec!["v1-dynamic"]);
    }

    #[tokio::test]
    async fn test_activation_survives_failed_cleanup() {
        let network = StubNetwork::new();
        let (worker, dir) = file_backed_worker(network, test_config("v2")).await;
        worker.cache().open_partition("v1-static").await.unwrap();
        worker.install().await.unwrap();
        break_entries(&dir).await;

        let removed = worker.activate().await.unwrap();

        assert!(removed.is_empty());
        assert_eq!(worker.state().await, LifecycleState::Active);
        let report = worker.prune_stale_partitions().await;
        assert_eq!(report.failed, vec!["v1-static".to_string()]);
    }
}
