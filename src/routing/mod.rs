//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Discovered containers
//!     → route.rs (validated Route values)
//!     → table.rs (ordered, deduplicated RouteTable; diff against current)
//!     → store.rs (versioned snapshot, committed after a successful apply)
//! ```
//!
//! # Design Decisions
//! - Tables are immutable; every change builds a new one
//! - Consumers receive `Arc` snapshots, never a mutable handle
//! - Change detection is whole-table: any difference regenerates everything
//! - Duplicate hosts: last discovered wins

pub mod route;
pub mod store;
pub mod table;

pub use route::{Route, RouteError};
pub use store::{RouteStore, Snapshot};
pub use table::{diff, DroppedDuplicate, RouteTable};
