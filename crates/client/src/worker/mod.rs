//! The request-proxy worker.
//!
//! ### Events
//! - The host delivers install, activate, fetch, message, push and
//!   notification-click events through [`Worker::dispatch`].
//! - Each event kind maps to one handler in a dispatch table; a handler
//!   returns a future and the event counts as handled only once the host has
//!   awaited it. Cache writes complete before a fetch resolves.
//!
//! ### Partitions
//! - `<version>-static`: the asset manifest, written atomically at install.
//! - `<version>-dynamic`: successful `GET` responses, written as they arrive.
//! - Anything else is removed at activation and by `clear-cache`.
//!
//! ### Strategies
//! - Documents: network first, then cache, fallback document, offline page.
//! - Assets: cache first, then network, then placeholder image or 404.
//! - Everything else: network first, then cache, else the network error.

pub mod control;
pub mod fallback;
pub mod lifecycle;
pub mod phases;
pub mod push;
pub mod router;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use pwa_core::{AppConfig, CacheDb, ConfigError, Error, PartitionNames, ProxyRequest, ProxyResponse};
use serde::Serialize;
use tokio::sync::{RwLock, oneshot};
use url::Url;

use crate::fetch::Network;

pub use control::{ControlMessage, ControlReply};
pub use lifecycle::{Lifecycle, LifecycleState, Trigger};
pub use push::{Notification, NotificationAction, PushPayload};
pub use router::{Route, classify};

/// Static settings of one worker version.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Application scope; its origin bounds interception.
    pub scope: Url,
    pub partitions: PartitionNames,
    /// Asset manifest, already resolved against `scope`.
    pub precache: Vec<Url>,
    /// Static-partition document served when a navigation fails offline.
    pub fallback_document: Url,
}

impl WorkerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            scope: config.scope_url()?,
            partitions: config.partition_names(),
            precache: config.precache_urls()?,
            fallback_document: config.fallback_document_url()?,
        })
    }

    /// Root window opened from notification clicks.
    pub fn root_url(&self) -> Url {
        let mut root = self.scope.clone();
        root.set_path("/");
        root.set_query(None);
        root
    }
}

/// Events delivered by the host.
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(ProxyRequest),
    Message { data: serde_json::Value, reply: Option<oneshot::Sender<ControlReply>> },
    Push { payload: Option<Bytes> },
    NotificationClick { action: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Message,
    Push,
    NotificationClick,
}

impl WorkerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorkerEvent::Install => EventKind::Install,
            WorkerEvent::Activate => EventKind::Activate,
            WorkerEvent::Fetch(_) => EventKind::Fetch,
            WorkerEvent::Message { .. } => EventKind::Message,
            WorkerEvent::Push { .. } => EventKind::Push,
            WorkerEvent::NotificationClick { .. } => EventKind::NotificationClick,
        }
    }
}

/// Where a response handed back to the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    Network,
    Cache,
    /// The static partition's copy of the fallback document.
    FallbackDocument,
    /// Generated locally (offline page, placeholder image, 404).
    Synthesized,
}

/// A fetch event's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    pub source: ResponseSource,
    pub response: ProxyResponse,
}

/// What the host should do once an event's handler has finished.
#[derive(Debug)]
pub enum EventOutcome {
    /// Manifest stored; the worker is waiting with skip-waiting requested.
    Installed { cached: usize },
    /// Stale partitions removed; the worker now controls all clients.
    Activated { removed: Vec<String> },
    /// The request is not intercepted; the host fetches it directly.
    Passthrough,
    Resolved(Resolution),
    /// A control message was processed (any reply went to its channel).
    Handled,
    ShowNotification(Notification),
    /// Nothing to do (e.g. empty or malformed push payload).
    Ignored,
    /// Close the clicked notification and open or focus this window.
    OpenWindow(Url),
    /// Close the clicked notification.
    CloseNotification,
}

type Handler = for<'a> fn(&'a Worker, WorkerEvent) -> BoxFuture<'a, Result<EventOutcome, Error>>;

/// Event kind → handler.
const DISPATCH: [(EventKind, Handler); 6] = [
    (EventKind::Install, on_install as Handler),
    (EventKind::Activate, on_activate as Handler),
    (EventKind::Fetch, on_fetch as Handler),
    (EventKind::Message, on_message as Handler),
    (EventKind::Push, on_push as Handler),
    (EventKind::NotificationClick, on_notification_click as Handler),
];

fn unexpected(expected: EventKind) -> Error {
    Error::InvalidInput(format!("handler for {expected:?} received another event kind"))
}

fn on_install(worker: &Worker, _event: WorkerEvent) -> BoxFuture<'_, Result<EventOutcome, Error>> {
    Box::pin(async move { worker.install().await.map(|cached| EventOutcome::Installed { cached }) })
}

fn on_activate(worker: &Worker, _event: WorkerEvent) -> BoxFuture<'_, Result<EventOutcome, Error>> {
    Box::pin(async move { worker.activate().await.map(|removed| EventOutcome::Activated { removed }) })
}

fn on_fetch(worker: &Worker, event: WorkerEvent) -> BoxFuture<'_, Result<EventOutcome, Error>> {
    Box::pin(async move {
        let WorkerEvent::Fetch(request) = event else {
            return Err(unexpected(EventKind::Fetch));
        };
        worker.handle_fetch(request).await
    })
}

fn on_message(worker: &Worker, event: WorkerEvent) -> BoxFuture<'_, Result<EventOutcome, Error>> {
    Box::pin(async move {
        let WorkerEvent::Message { data, reply } = event else {
            return Err(unexpected(EventKind::Message));
        };
        worker.handle_message(&data, reply).await;
        Ok(EventOutcome::Handled)
    })
}

fn on_push(worker: &Worker, event: WorkerEvent) -> BoxFuture<'_, Result<EventOutcome, Error>> {
    Box::pin(async move {
        let WorkerEvent::Push { payload } = event else {
            return Err(unexpected(EventKind::Push));
        };
        Ok(match worker.handle_push(payload.as_deref()) {
            Some(notification) => EventOutcome::ShowNotification(notification),
            None => EventOutcome::Ignored,
        })
    })
}

fn on_notification_click(worker: &Worker, event: WorkerEvent) -> BoxFuture<'_, Result<EventOutcome, Error>> {
    Box::pin(async move {
        let WorkerEvent::NotificationClick { action } = event else {
            return Err(unexpected(EventKind::NotificationClick));
        };
        Ok(worker.handle_notification_click(action.as_deref()))
    })
}

/// One version of the request proxy.
pub struct Worker {
    config: WorkerConfig,
    db: CacheDb,
    network: Arc<dyn Network>,
    lifecycle: RwLock<Lifecycle>,
}

impl Worker {
    pub fn new(config: WorkerConfig, db: CacheDb, network: Arc<dyn Network>) -> Self {
        Self::with_lifecycle(config, db, network, Lifecycle::new())
    }

    pub fn with_lifecycle(config: WorkerConfig, db: CacheDb, network: Arc<dyn Network>, lifecycle: Lifecycle) -> Self {
        Self { config, db, network, lifecycle: RwLock::new(lifecycle) }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn partitions(&self) -> &PartitionNames {
        &self.config.partitions
    }

    pub fn cache(&self) -> &CacheDb {
        &self.db
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.read().await.state()
    }

    /// Route an event to its handler and wait for the handler to finish.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome, Error> {
        let kind = event.kind();
        let handler = DISPATCH
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, handler)| *handler)
            .ok_or_else(|| Error::InvalidInput(format!("no handler for {kind:?}")))?;
        handler(self, event).await
    }

    /// Mark this worker as replaced by a newer version.
    pub async fn supersede(&self) -> Result<(), Error> {
        self.lifecycle.write().await.apply(Trigger::Superseded).map(|_| ())
    }

    async fn handle_fetch(&self, request: ProxyRequest) -> Result<EventOutcome, Error> {
        if !self.lifecycle.read().await.controls_clients() {
            tracing::debug!("worker not active, passing through {}", request.url);
            return Ok(EventOutcome::Passthrough);
        }

        let route = classify(&request, &self.config.scope);
        tracing::debug!(?route, method = %request.method, url = %request.url, "intercepted request");

        let resolution = match route {
            Route::Passthrough => return Ok(EventOutcome::Passthrough),
            Route::NetworkFirstDocument => self.network_first_document(&request).await,
            Route::CacheFirstAsset => self.cache_first_asset(&request).await,
            Route::NetworkFirstGeneric => self.network_first_generic(&request).await?,
        };

        Ok(EventOutcome::Resolved(resolution))
    }
}
