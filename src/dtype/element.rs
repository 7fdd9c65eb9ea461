//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::Pod;

/// Trait for Rust types that can be stored as array elements
///
/// Connects Rust's static types to stridr's runtime dtype tags. Kernels go
/// through `to_f64`/`from_f64` so a single generic body serves every dtype;
/// integer payloads use `from_i64`/`from_u64` so wide values stay exact.
///
/// `bool` is not `Pod`, so boolean arrays are stored as `u8` (0 or 1) and read
/// back as `u8`.
pub trait Element: Copy + Send + Sync + Pod + PartialOrd + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type (saturating for integers)
    fn from_f64(v: f64) -> Self;

    /// Convert from i64 (wrapping for narrower integers)
    fn from_i64(v: i64) -> Self;

    /// Convert from u64 (wrapping for narrower integers)
    fn from_u64(v: u64) -> Self;

    /// `self + step * i` in this type's own arithmetic
    ///
    /// Integers wrap on overflow, matching a cast of the exact result.
    fn offset_by(self, step: Self, i: usize) -> Self;
}

macro_rules! impl_primitive_element {
    ($($ty:ident => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $ty
                }

                #[inline]
                fn from_i64(v: i64) -> Self {
                    v as $ty
                }

                #[inline]
                fn from_u64(v: u64) -> Self {
                    v as $ty
                }

                impl_primitive_element!(@offset $ty);
            }
        )*
    };
    (@offset f64) => {
        #[inline]
        fn offset_by(self, step: Self, i: usize) -> Self {
            self + step * i as f64
        }
    };
    (@offset f32) => {
        #[inline]
        fn offset_by(self, step: Self, i: usize) -> Self {
            self + step * i as f32
        }
    };
    (@offset $ty:ty) => {
        #[inline]
        fn offset_by(self, step: Self, i: usize) -> Self {
            self.wrapping_add(step.wrapping_mul(i as $ty))
        }
    };
}

impl_primitive_element! {
    f64 => F64,
    f32 => F32,
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
}

#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        half::f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        half::f16::from_f64(v as f64)
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        half::f16::from_f64(v as f64)
    }

    #[inline]
    fn offset_by(self, step: Self, i: usize) -> Self {
        half::f16::from_f64(self.to_f64() + step.to_f64() * i as f64)
    }
}

#[cfg(feature = "f16")]
impl Element for half::bf16 {
    const DTYPE: DType = DType::BF16;

    #[inline]
    fn to_f64(self) -> f64 {
        half::bf16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        half::bf16::from_f64(v as f64)
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        half::bf16::from_f64(v as f64)
    }

    #[inline]
    fn offset_by(self, step: Self, i: usize) -> Self {
        half::bf16::from_f64(self.to_f64() + step.to_f64() * i as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_dtype() {
        assert_eq!(f64::DTYPE, DType::F64);
        assert_eq!(i16::DTYPE, DType::I16);
        assert_eq!(u8::DTYPE, DType::U8);
    }

    #[test]
    fn test_element_conversions() {
        assert_eq!(f32::from_f64(2.5).to_f64(), 2.5);
        assert_eq!(i32::from_f64(42.9), 42);
        // float-to-int casts saturate
        assert_eq!(u8::from_f64(-3.0), 0);
        assert_eq!(i8::from_f64(1000.0), i8::MAX);
    }

    #[test]
    fn test_wide_integer_conversions_are_exact() {
        let big = (1i64 << 53) + 1;
        assert_eq!(i64::from_i64(big), big);
        assert_eq!(u64::from_u64(u64::MAX), u64::MAX);
        // narrower integers keep the low bits
        assert_eq!(u8::from_i64(-1), u8::MAX);
        assert_eq!(i16::from_u64(0x1_0005), 5);
    }

    #[test]
    fn test_offset_by() {
        let big = (1i64 << 53) + 1;
        assert_eq!(big.offset_by(1, 2), big + 2);
        assert_eq!(10u8.offset_by(250, 1), 4);
        assert_eq!(0.5f32.offset_by(0.25, 2), 1.0);
    }

    #[cfg(feature = "f16")]
    #[test]
    fn test_half_element_conversions() {
        assert_eq!(half::f16::DTYPE, DType::F16);
        assert_eq!(half::bf16::from_f64(1.0).to_f64(), 1.0);
    }
}
