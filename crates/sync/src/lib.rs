//! # CareFlow Sync
//!
//! Mirrors clients and appointments with an external system of record that
//! offers no push notifications. Records are pulled by polling, upserted
//! locally by their external id, and locally created records are pushed back
//! so that the remote id can be stored.
//!
//! Every transport or parse failure is logged and treated as "no data"; sync
//! never fails the local operation that triggered it.

pub mod config;
pub mod remote;
pub mod scheduler;
pub mod service;

pub use config::SyncConfig;
pub use remote::{HttpRemoteApi, RemoteApi};
pub use scheduler::PeriodicTrigger;
pub use service::{ExternalSyncService, SyncReport, SyncSummary};
