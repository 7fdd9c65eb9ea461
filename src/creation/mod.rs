//! Array construction
//!
//! Every way of producing a fresh array lives here as an inherent
//! `impl<R: Runtime> Tensor<R>` block:
//!
//! - `factory`: `empty`, `empty_with_strides`, `from_host_bytes`,
//!   `from_slice`, `full`, `full_scalar`, `zeros`, `ones`
//! - `range`: `arange` and its [`ArangeOptions`]
//! - `like`: `empty_like`, `full_like`, `zeros_like`, `ones_like`
//! - `copy`: `copy` and `as_constant`
//!
//! Arguments are validated before the device is asked for memory, so a
//! rejected request never allocates.

mod copy;
mod factory;
mod like;
mod range;

pub use copy::CopyKind;
pub use range::ArangeOptions;
