//! Strides type: byte offsets for array memory layout

use super::shape::STACK_DIMS;
use smallvec::SmallVec;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;

/// Strides type: byte distance between consecutive elements along each dimension
///
/// Signed so a reversed axis (e.g. after `flip`) walks memory backwards.
/// NOTE: Strides are in BYTES, not elements
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Strides(SmallVec<[isize; STACK_DIMS]>);

impl Strides {
    /// Canonical row-major (C-order) byte strides for `shape`
    ///
    /// Strides saturate at `isize::MAX` when the packed size does not fit;
    /// such shapes are rejected before anything is allocated for them.
    ///
    /// ```
    /// use stridr::tensor::Strides;
    /// let strides = Strides::contiguous(&[2, 3], 4);
    /// assert_eq!(strides.as_slice(), &[12, 4]);
    /// ```
    pub fn contiguous(shape: &[usize], element_size: usize) -> Self {
        let mut strides: SmallVec<[isize; STACK_DIMS]> = SmallVec::with_capacity(shape.len());
        let mut stride = isize::try_from(element_size).unwrap_or(isize::MAX);

        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride = stride.saturating_mul(isize::try_from(dim).unwrap_or(isize::MAX));
        }

        strides.reverse();
        Self(strides)
    }

    /// View strides as a slice.
    pub fn as_slice(&self) -> &[isize] {
        self.0.as_slice()
    }

    /// Number of stride entries.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Swap two strides.
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }

    /// Mutable access to one stride.
    pub(crate) fn set(&mut self, index: usize, stride: isize) {
        self.0[index] = stride;
    }
}

impl Deref for Strides {
    type Target = [isize];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl fmt::Debug for Strides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<[isize]> for Strides {
    fn as_ref(&self) -> &[isize] {
        self.0.as_slice()
    }
}

impl From<Vec<isize>> for Strides {
    fn from(value: Vec<isize>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl From<&[isize]> for Strides {
    fn from(value: &[isize]) -> Self {
        Self(value.iter().copied().collect())
    }
}

impl<const N: usize> From<[isize; N]> for Strides {
    fn from(value: [isize; N]) -> Self {
        Self(value.into_iter().collect())
    }
}

impl<const N: usize> From<&[isize; N]> for Strides {
    fn from(value: &[isize; N]) -> Self {
        Self(value.iter().copied().collect())
    }
}

impl FromIterator<isize> for Strides {
    fn from_iter<T: IntoIterator<Item = isize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
