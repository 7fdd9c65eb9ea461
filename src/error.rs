//! Error types for stridr

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using stridr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while laying out or constructing arrays
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch between data and requested shape
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Strides do not have one entry per dimension
    #[error("Stride mismatch: shape has {shape_ndim} dimensions but {strides_ndim} strides given")]
    StrideMismatch {
        /// Number of dimensions in the shape
        shape_ndim: usize,
        /// Number of stride entries
        strides_ndim: usize,
    },

    /// Invalid dimension index
    #[error("Invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// Value cannot be represented under the requested dtype
    #[error("DType error ({dtype}): {reason}")]
    DTypeError {
        /// The dtype the request was made for
        dtype: DType,
        /// Why the request is outside the dtype's domain
        reason: String,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a dtype domain error
    pub fn dtype_error(dtype: DType, reason: impl Into<String>) -> Self {
        Self::DTypeError {
            dtype,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::invalid_argument("step", "must be non-zero");
        assert_eq!(err.to_string(), "Invalid argument 'step': must be non-zero");

        let err = Error::OutOfMemory { size: 64 };
        assert_eq!(err.to_string(), "Out of memory: failed to allocate 64 bytes");

        let err = Error::StrideMismatch {
            shape_ndim: 2,
            strides_ndim: 1,
        };
        assert!(err.to_string().contains("2 dimensions"));
    }
}
