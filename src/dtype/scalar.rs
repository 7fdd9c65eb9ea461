//! Scalar: a single value tagged with a dtype

use super::{DType, DTypeKind, Element};
use std::fmt;

/// Payload of a [`Scalar`], one variant per dtype kind
#[derive(Copy, Clone, Debug, PartialEq)]
enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// A single value paired with the dtype it was created under
///
/// Scalars carry fill values and range bounds into the construction layer.
/// Rust primitives convert with the matching dtype (`3i32` becomes an `I32`
/// scalar, `0.5f64` an `F64` scalar), which is what dtype inference keys on.
///
/// ```
/// use stridr::dtype::{DType, Scalar};
///
/// let s = Scalar::from(3i32);
/// assert_eq!(s.dtype(), DType::I32);
/// assert_eq!(s.to_f64(), 3.0);
/// assert_eq!(s.cast(DType::F32).dtype(), DType::F32);
/// ```
#[derive(Copy, Clone, PartialEq)]
pub struct Scalar {
    value: Value,
    dtype: DType,
}

impl Scalar {
    /// Create a scalar holding `value` converted into `dtype`
    pub fn new(value: f64, dtype: DType) -> Self {
        let value = match dtype.kind() {
            DTypeKind::Bool => Value::Bool(value != 0.0),
            DTypeKind::SignedInt => Value::Int(value as i64),
            DTypeKind::UnsignedInt => Value::UInt(value as u64),
            DTypeKind::Float => Value::Float(value),
        };
        Self { value, dtype }
    }

    /// The scalar's dtype
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Kind of the scalar's dtype
    #[inline]
    pub fn kind(&self) -> DTypeKind {
        self.dtype.kind()
    }

    /// Numeric value as f64 (`true` is 1.0)
    pub fn to_f64(&self) -> f64 {
        match self.value {
            Value::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Int(v) => v as f64,
            Value::UInt(v) => v as f64,
            Value::Float(v) => v,
        }
    }

    /// Whether the value is zero under its own dtype
    pub fn is_zero(&self) -> bool {
        match self.value {
            Value::Bool(b) => !b,
            Value::Int(v) => v == 0,
            Value::UInt(v) => v == 0,
            Value::Float(v) => v == 0.0,
        }
    }

    /// Convert the payload straight into an element type
    ///
    /// Integer payloads convert without passing through f64, so `i64` and
    /// `u64` values beyond 2^53 survive.
    pub fn to_element<T: Element>(&self) -> T {
        match self.value {
            Value::Bool(b) => T::from_u64(b as u64),
            Value::Int(v) => T::from_i64(v),
            Value::UInt(v) => T::from_u64(v),
            Value::Float(v) => T::from_f64(v),
        }
    }

    /// Re-tag the scalar under another dtype, converting its value
    pub fn cast(&self, dtype: DType) -> Self {
        if dtype == self.dtype {
            return *self;
        }

        let value = match (dtype.kind(), self.value) {
            (DTypeKind::Bool, _) => Value::Bool(!self.is_zero()),
            (DTypeKind::SignedInt, Value::Int(v)) => Value::Int(v),
            (DTypeKind::SignedInt, Value::UInt(v)) => Value::Int(v as i64),
            (DTypeKind::UnsignedInt, Value::UInt(v)) => Value::UInt(v),
            (DTypeKind::UnsignedInt, Value::Int(v)) => Value::UInt(v as u64),
            (DTypeKind::Float, _) => Value::Float(self.to_f64()),
            (_, Value::Bool(_) | Value::Float(_)) => return Self::new(self.to_f64(), dtype),
        };
        Self { value, dtype }
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({}, {})", self, self.dtype)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self {
            value: Value::Bool(value),
            dtype: DType::Bool,
        }
    }
}

macro_rules! impl_scalar_from {
    ($variant:ident, $wide:ty, $($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Self {
                        value: Value::$variant(value as $wide),
                        dtype: DType::$dtype,
                    }
                }
            }
        )*
    };
}

impl_scalar_from!(Int, i64, i8 => I8, i16 => I16, i32 => I32, i64 => I64);
impl_scalar_from!(UInt, u64, u8 => U8, u16 => U16, u32 => U32, u64 => U64);
impl_scalar_from!(Float, f64, f32 => F32, f64 => F64);

#[cfg(feature = "f16")]
impl From<half::f16> for Scalar {
    fn from(value: half::f16) -> Self {
        Self::new(value.to_f64(), DType::F16)
    }
}

#[cfg(feature = "f16")]
impl From<half::bf16> for Scalar {
    fn from(value: half::bf16) -> Self {
        Self::new(value.to_f64(), DType::BF16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Scalar::from(true).dtype(), DType::Bool);
        assert_eq!(Scalar::from(7u16).dtype(), DType::U16);
        assert_eq!(Scalar::from(-2i64).to_f64(), -2.0);
        assert_eq!(Scalar::from(1.5f32).dtype(), DType::F32);
    }

    #[test]
    fn test_is_zero() {
        assert!(Scalar::from(0i8).is_zero());
        assert!(Scalar::from(false).is_zero());
        assert!(Scalar::from(-0.0f64).is_zero());
        assert!(!Scalar::from(0.25f32).is_zero());
        // a fractional step truncates to zero under an integer dtype
        assert!(Scalar::new(0.5, DType::I32).is_zero());
    }

    #[test]
    fn test_cast() {
        let s = Scalar::from(-7i64).cast(DType::I32);
        assert_eq!(s.dtype(), DType::I32);
        assert_eq!(s.to_f64(), -7.0);

        let b = Scalar::from(2.0f64).cast(DType::Bool);
        assert_eq!(b.to_f64(), 1.0);

        let f = Scalar::from(3u8).cast(DType::F64);
        assert_eq!(f.to_f64(), 3.0);
        assert_eq!(f.kind(), DTypeKind::Float);
    }

    #[test]
    fn test_cast_keeps_wide_integers() {
        let big = (1i64 << 53) + 1;
        let s = Scalar::from(big).cast(DType::U64);
        assert_eq!(s.to_element::<u64>(), big as u64);
        assert_eq!(Scalar::from(u64::MAX).cast(DType::U64).to_element::<u64>(), u64::MAX);
        assert_eq!(Scalar::from(u64::MAX).to_element::<u64>(), u64::MAX);
        assert_eq!(Scalar::from(big).to_element::<i64>(), big);
    }

    #[test]
    fn test_to_element() {
        assert_eq!(Scalar::from(true).to_element::<u8>(), 1);
        assert_eq!(Scalar::from(2.75f64).to_element::<i32>(), 2);
        assert_eq!(Scalar::from(-1i8).to_element::<f32>(), -1.0);
        assert_eq!(Scalar::from(i64::MAX).cast(DType::I64).to_element::<i64>(), i64::MAX);
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::from(4i32).to_string(), "4");
        assert_eq!(format!("{:?}", Scalar::from(true)), "Scalar(true, bool)");
    }
}
