//! Typed, format-agnostic description of mesh geometry.
//!
//! The data model is split between [`MeshData`], which owns or borrows at most
//! two byte buffers (index and vertex data), and lightweight descriptors
//! ([`MeshIndexData`], [`MeshAttributeData`]) that say how to interpret
//! sub-ranges of those buffers. Vertex layouts are fully general: interleaved
//! or deinterleaved, aliased, padded, negatively strided at the descriptor
//! level, with builtin or custom attribute semantics.
//!
//! Everything is checked at construction; the accessors afterwards are cheap
//! views that cannot go out of bounds.

mod attribute;
mod container;
mod error;
mod format;
mod index;
mod primitive;
mod semantic;
mod typed;
mod view;

pub use attribute::*;
pub use container::*;
pub use error::*;
pub use format::*;
pub use index::*;
pub use primitive::*;
pub use semantic::*;
pub use typed::*;
pub use view::*;

pub(crate) use std::any::Any;
pub(crate) use std::marker::PhantomData;
pub(crate) use std::sync::Arc;

pub(crate) use bitflags::bitflags;
pub(crate) use bytemuck::Pod;
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use smallvec::SmallVec;
