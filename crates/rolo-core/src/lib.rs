//! rolo-core library.
//!
//! Identity deduplication and the Contact/Lead lifecycle for a
//! multi-tenant CRM. [`lifecycle::LifecycleEngine`] is the entry point;
//! [`db::SqliteStore`] is the bundled store.
//!
//! # Conventions
//!
//! - **Errors**: engine operations return [`error::LifecycleResult`]; store
//!   and query helpers return `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod phone;
pub mod pipeline;
pub mod scope;
pub mod store;

pub use error::{ErrorCode, LifecycleError, LifecycleResult};
pub use lifecycle::{EngineConfig, LifecycleEngine, PersonDraft, PersonPatch};
