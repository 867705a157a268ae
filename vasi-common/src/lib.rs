//! # VASI Common Library
//!
//! Shared code for the virtual appliance sizing viewer including:
//! - Platform catalog and resource descriptors
//! - Configuration loading
//! - Resource fetching (HTTP origin, local folder, in-memory)
//! - Workbook parsing
//! - Dataset and note loaders with per-platform load tracking
//! - Row filtering helpers

pub mod config;
pub mod dataset;
pub mod error;
pub mod events;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod notes;
pub mod platform;
pub mod sse;
pub mod store;
pub mod workbook;

pub use dataset::{Dataset, RowRecord};
pub use error::{Error, Result};
pub use events::LoadEvent;
pub use loader::ResourceLoader;
pub use notes::{LoadStatus, NoteEntry};
pub use platform::{Platform, ResourceCatalog, ResourceKind};
pub use store::PlatformStore;
