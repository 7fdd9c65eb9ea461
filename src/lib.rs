//! # stridr
//!
//! **Strided n-dimensional arrays and the factories that build them.**
//!
//! stridr describes where array elements live in a byte buffer (shape, signed
//! byte strides, origin offset), sizes buffers for arbitrary strided layouts,
//! and constructs arrays on a compute backend: uninitialized, from host
//! memory, filled with a constant, as an evenly spaced range, shaped after
//! another array, or as a detached contiguous copy.
//!
//! ## Quick Start
//!
//! ```rust
//! use stridr::prelude::*;
//!
//! let device = CpuDevice::new();
//!
//! let a = Tensor::<CpuRuntime>::arange(ArangeOptions::new(6i32), &device)?;
//! assert_eq!(a.to_vec::<i32>()?, [0, 1, 2, 3, 4, 5]);
//!
//! let m = Tensor::<CpuRuntime>::full(&[2, 3], 1.5, DType::F32, &device)?;
//! let t = m.transpose(0, 1)?;
//! assert!(!t.is_contiguous());
//!
//! let z = Tensor::zeros_like(&t)?;
//! assert_eq!(z.shape(), &[3, 2]);
//! assert!(z.is_contiguous());
//! # Ok::<(), stridr::error::Error>(())
//! ```
//!
//! ## Backends
//!
//! Every constructor takes an explicit `&R::Device`; there is no global
//! "current device". Backends implement [`runtime::Runtime`], which keeps
//! the construction layer testable against a mock.
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): Multi-threaded CPU kernels
//! - `f16`: Half-precision floats (F16, BF16)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod creation;
pub mod dtype;
pub mod error;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::creation::{ArangeOptions, CopyKind};
    pub use crate::dtype::{DType, Scalar};
    pub use crate::error::{Error, Result};
    pub use crate::runtime::{Device, Runtime};
    pub use crate::tensor::{Layout, Shape, Strides, Tensor};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::{CpuDevice, CpuRuntime};
}

/// Default runtime based on enabled features
#[cfg(feature = "cpu")]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
