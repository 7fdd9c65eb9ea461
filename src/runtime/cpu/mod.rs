//! CPU runtime implementation
//!
//! The CPU runtime uses standard heap allocation and provides the reference
//! implementation of every backend capability.
//!
//! # Strided access
//!
//! Kernels walk arbitrary byte strides, including zero (broadcast-style) and
//! negative (reversed) ones. Contiguous, aligned targets take a flat fast
//! path that runs on rayon when the `rayon` feature is enabled and the
//! element count reaches the device's `parallel_min_len`.

mod device;
pub(crate) mod helpers;
pub(crate) mod kernels;
mod runtime;

pub use device::{CpuDevice, DEFAULT_PARALLEL_MIN_LEN};
pub use runtime::CpuRuntime;
