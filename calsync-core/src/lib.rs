//! Core types for calsync.
//!
//! This crate reconciles a remote event feed with a local calendar store:
//! - `diff` computes the insert/update/delete plan for one pass
//! - `provision` makes sure the account's calendar exists
//! - `store` and `remote` define the collaborators (with SQLite and HTTP implementations)
//! - `runner` drives a full sync pass and aggregates its statistics

pub mod account;
pub mod config;
pub mod credentials;
pub mod diff;
pub mod error;
pub mod event;
pub mod provision;
pub mod remote;
pub mod runner;
pub mod store;

pub use account::Account;
pub use error::{ErrorClass, SyncError, SyncResult};
pub use event::{EventRecord, EventSnapshot, ExternalId, LocalEntry, LocalId, LocalIndex, RemoteEvent};
pub use runner::{SyncRunner, SyncStats};
