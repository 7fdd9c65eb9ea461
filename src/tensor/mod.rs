//! Tensor types and memory layout
//!
//! This module provides the core `Tensor` type, an n-dimensional array stored
//! on a compute device, together with the value types that describe where its
//! elements live: [`Shape`], byte [`Strides`] and the validated [`Layout`].

mod core;
mod graph;
mod id;
mod layout;
mod shape;
mod storage;
mod strides;

pub use core::Tensor;
pub use graph::GradNode;
pub use id::TensorId;
pub use layout::{Layout, checked_required_bytes, required_bytes};
pub use shape::Shape;
pub use storage::Storage;
pub use strides::Strides;
