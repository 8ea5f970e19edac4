//! Core library for the OKR tracker.
//!
//! This crate provides the domain models, storage and the hierarchy engine
//! (progress, cascading deletes, nested views, AI-assisted generation),
//! independent of any transport layer (HTTP, MCP, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use okr_core::db::Database;
//! use okr_core::hierarchy;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let dashboard = hierarchy::dashboard(&db)?;
//! println!("{} objectives", dashboard.total_objectives);
//! # Ok::<(), okr_core::Error>(())
//! ```
//!
//! # Consistency
//!
//! The store is the only shared mutable resource and no locks span multiple
//! records. Cascading deletes and bulk generation run as sequences of single
//! record writes: a failure midway leaves earlier writes in place, and a key
//! result created concurrently with the deletion of its objective may survive
//! as an orphan. Treat the hierarchy as best-effort consistent.

pub mod cascade;
pub mod db;
pub mod error;
pub mod generation;
pub mod hierarchy;
pub mod lifecycle;
pub mod models;
pub mod progress;
pub mod store;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{Error, RecordKind, Result};
pub use generation::{GenerationOrchestrator, TextGenerator};
pub use store::{HierarchyStore, InMemoryStore};
