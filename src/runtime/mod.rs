//! Runtime backends for array construction
//!
//! This module defines the `Runtime` trait, the capability surface the
//! construction layer consumes, and a CPU reference implementation.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity, static dispatch)
//! ├── Device (identifies a specific GPU/CPU, carries its configuration)
//! ├── allocate / deallocate / from_host_memory (memory)
//! ├── copy_to_device / copy_from_device / copy_strided (transfers)
//! └── fill / arange (value population kernels)
//! ```

mod traits;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use traits::{Device, Runtime};
