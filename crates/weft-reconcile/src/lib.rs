//! weft-reconcile: keeps a mutation-sensitive host tree in sync with the
//! declarative rendering of weft's logical document.
//!
//! This crate provides:
//! - `Reconciler<H>` - runs update passes, owns the identity tables
//! - `HostTree` trait for the presentation tree, `MemoryTree` in-memory impl
//! - `RenderObject` - element / text / fragment / native render descriptions
//! - Position mapping between `DocPosition` and `HostPoint`
//!
//! Nodes are matched to their previous records by a configurable similarity
//! score, so host nodes survive re-renders that keep the same structure and
//! text edits only rewrite the changed span.

mod apply;
pub mod config;
pub mod diff;
pub mod document;
mod engine;
pub mod error;
pub mod host;
mod locate;
pub mod memory;
pub mod registry;
pub mod render;
pub mod score;
pub mod text;
pub mod types;

pub use config::{MatchWeights, ReconcileConfig};
pub use document::{DocumentTree, Invalidations, Renderer};
pub use engine::{Pass, PassReport, Reconciler};
pub use error::{ConfigError, ReconcileError, Result};
pub use host::{HostError, HostTree};
pub use memory::{HostOp, MemoryTree};
pub use registry::RecordSnapshot;
pub use render::{Attributes, Child, Hooks, Lifecycle, NativeSlot, RenderMeta, RenderObject};
pub use smol_str::SmolStr;
pub use types::{DocPosition, HostNodeId, HostPoint, LogicalId, Placement, RecordId};
