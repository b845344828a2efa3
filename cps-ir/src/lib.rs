//! Builder library for a continuation-passing-style IR consumed by an
//! external optimizing backend.
//!
//! [`types`] builds type nodes, [`defs`] builds value/instruction defs,
//! [`continuation`] builds the self-referential continuation nodes that
//! thread control flow, [`combinators`] composes those into canonical
//! patterns (branches, counted loops, string literals), and
//! [`module`] is the top-level container that assigns names, tracks
//! the open/sealed lifecycle, and serializes everything to JSON.
//!
//! Builder handles ([`types::Type`], [`defs::Def`]) are cheap,
//! `Rc`-backed, reference-identity-equal, and lazily materialized: a
//! handle you never pass to [`module::ModuleContext::add`] or
//! [`module::ModuleContext::register`] (directly or transitively)
//! never appears in the serialized document.

pub mod combinators;
pub mod continuation;
pub mod defs;
pub mod error;
mod names;
pub mod module;
pub mod import;
pub mod types;

pub use defs::{ArithOperand, Def, IndexOperand, StoreOperand};
pub use error::{CoreError, Result};
pub use import::ImportedModule;
pub use module::{Document, ExternalToolchain, ModuleContext, RecordingToolchain, SealTarget, ToolchainStrategy};
pub use types::{PrimTag, Type};
