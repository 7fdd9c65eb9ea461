//! Shared helpers for CPU kernels

/// Macro for dtype dispatch to typed kernel calls
///
/// Matches on dtype and runs the block with `$T` bound to the storage type.
/// Usage: `dispatch_dtype!(dtype, T => { code using T }, "op_name")`
///
/// `Bool` binds to `u8`; callers normalize values to 0/1 themselves.
/// F16 and BF16 are supported when the "f16" feature is enabled; without it
/// they return `UnsupportedDType`.
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            DType::F64 => {
                type $T = f64;
                $body
            }
            DType::F32 => {
                type $T = f32;
                $body
            }
            DType::F16 => {
                #[cfg(feature = "f16")]
                {
                    type $T = half::f16;
                    $body
                }
                #[cfg(not(feature = "f16"))]
                {
                    return Err(Error::UnsupportedDType {
                        dtype: $dtype,
                        op: $error_op,
                    });
                }
            }
            DType::BF16 => {
                #[cfg(feature = "f16")]
                {
                    type $T = half::bf16;
                    $body
                }
                #[cfg(not(feature = "f16"))]
                {
                    return Err(Error::UnsupportedDType {
                        dtype: $dtype,
                        op: $error_op,
                    });
                }
            }
            DType::I64 => {
                type $T = i64;
                $body
            }
            DType::I32 => {
                type $T = i32;
                $body
            }
            DType::I16 => {
                type $T = i16;
                $body
            }
            DType::I8 => {
                type $T = i8;
                $body
            }
            DType::U64 => {
                type $T = u64;
                $body
            }
            DType::U32 => {
                type $T = u32;
                $body
            }
            DType::U16 => {
                type $T = u16;
                $body
            }
            DType::U8 | DType::Bool => {
                type $T = u8;
                $body
            }
        }
    };
}

pub(crate) use dispatch_dtype;

use crate::dtype::{DType, Element, Scalar};

/// Convert a scalar into the storage encoding of `dtype`
///
/// Booleans collapse to 0/1; everything else converts the payload directly.
#[inline]
pub(crate) fn encode<T: Element>(dtype: DType, value: Scalar) -> T {
    if dtype.is_bool() {
        T::from_u64(!value.is_zero() as u64)
    } else {
        value.to_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_bool_normalizes() {
        assert_eq!(encode::<u8>(DType::Bool, Scalar::from(7i32)), 1);
        assert_eq!(encode::<u8>(DType::Bool, Scalar::from(0.5f64)), 1);
        assert_eq!(encode::<u8>(DType::Bool, Scalar::from(0u8)), 0);
        assert_eq!(encode::<u8>(DType::U8, Scalar::from(7u8)), 7);
    }

    #[test]
    fn test_encode_wide_integer() {
        let big = (1i64 << 53) + 1;
        assert_eq!(encode::<i64>(DType::I64, Scalar::from(big)), big);
        assert_eq!(encode::<u64>(DType::U64, Scalar::from(u64::MAX)), u64::MAX);
    }
}
