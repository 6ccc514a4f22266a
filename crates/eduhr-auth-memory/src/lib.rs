//! In-memory storage backends for eduhr-auth.
//!
//! This crate provides implementations of the storage traits from
//! `eduhr-auth`:
//!
//! - [`MemoryAccountStore`] - accounts with atomic login/email uniqueness
//! - [`MemorySessionStore`] - login sessions with a fixed lifetime
//! - [`MemorySettingsStore`] - the settings record, kept in memory
//! - [`FileSettingsStore`] - the settings record, persisted as JSON
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use eduhr_auth_memory::{MemoryAccountStore, MemorySessionStore};
//! use eduhr_auth::Reconciler;
//!
//! let reconciler = Reconciler::new(
//!     Arc::new(MemoryAccountStore::new()),
//!     Arc::new(MemorySessionStore::default()),
//! );
//! ```

pub mod account;
pub mod session;
pub mod settings;

pub use account::MemoryAccountStore;
pub use session::MemorySessionStore;
pub use settings::{FileSettingsStore, MemorySettingsStore};
