//! Client code for pwa-proxy.
//!
//! This crate provides the network fetch client and the request-proxy worker
//! (classification, caching strategies, lifecycle, control channel, push).

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network};

pub use worker::{
    ControlMessage, ControlReply, EventKind, EventOutcome, LifecycleState, Notification, Resolution, ResponseSource,
    Route, Worker, WorkerConfig, WorkerEvent,
};
