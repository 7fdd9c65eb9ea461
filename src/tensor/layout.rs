//! Layout: shape, byte strides, and origin offset for array memory layout

use super::{Shape, Strides};
use crate::error::{Error, Result};
use std::fmt;

/// Minimal number of bytes a strided layout addresses
///
/// This is the distance between the lowest- and highest-addressed element
/// reachable through `shape`/`strides`, plus one element. Stride signs are
/// ignored: a reversed axis needs exactly as many bytes as its forward
/// counterpart. Placing element `[0, …, 0]` inside that span is the caller's
/// job (see [`Layout::new`]).
///
/// - Any zero-sized dimension: `0`, whatever the strides.
/// - 0-dimensional shape: `element_size`.
///
/// # Panics
///
/// Panics on arithmetic overflow; use [`checked_required_bytes`] for
/// untrusted input.
///
/// ```
/// use stridr::tensor::required_bytes;
/// assert_eq!(required_bytes(&[2, 3], &[12, 4], 4), 24);
/// assert_eq!(required_bytes(&[4], &[-4], 4), 16);
/// assert_eq!(required_bytes(&[4, 0], &[-4, 100], 4), 0);
/// ```
pub fn required_bytes(shape: &[usize], strides: &[isize], element_size: usize) -> usize {
    checked_required_bytes(shape, strides, element_size)
        .expect("byte span of layout overflows usize")
}

/// Like [`required_bytes`], returning None instead of overflowing
pub fn checked_required_bytes(
    shape: &[usize],
    strides: &[isize],
    element_size: usize,
) -> Option<usize> {
    debug_assert_eq!(shape.len(), strides.len());

    if shape.contains(&0) {
        return Some(0);
    }

    shape
        .iter()
        .zip(strides.iter())
        .try_fold(element_size, |total, (&dim, &stride)| {
            (dim - 1)
                .checked_mul(stride.unsigned_abs())
                .and_then(|span| total.checked_add(span))
        })
}

/// Layout describes how array coordinates map onto a byte buffer
///
/// Byte address of element at indices [i0, i1, ..., in]:
///   offset + i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]
///
/// `offset` places element `[0, …, 0]` so that every reachable element lies
/// inside `[0, required_bytes)` of the buffer, including for negative strides.
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    /// Shape: size along each dimension
    shape: Shape,
    /// Strides: byte offset between consecutive elements along each dimension
    strides: Strides,
    /// Offset: byte position of the first logical element in the buffer
    offset: usize,
}

impl Layout {
    /// Create a new contiguous (row-major/C-order) layout
    ///
    /// # Example
    /// ```
    /// use stridr::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4], 4);
    /// assert_eq!(layout.shape(), &[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[48, 16, 4]);
    /// ```
    pub fn contiguous(shape: impl Into<Shape>, element_size: usize) -> Self {
        let shape = shape.into();
        let strides = Strides::contiguous(&shape, element_size);
        Self {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Create a layout with explicit byte strides
    ///
    /// Fails with `StrideMismatch` unless there is one stride per dimension.
    /// The origin offset is derived from the negative strides, so a reversed
    /// axis starts at the high end of its span. An element count or offset
    /// that overflows `usize` fails with `OutOfMemory`.
    pub fn new(shape: impl Into<Shape>, strides: impl Into<Strides>) -> Result<Self> {
        let shape = shape.into();
        let strides = strides.into();

        if shape.ndim() != strides.ndim() {
            return Err(Error::StrideMismatch {
                shape_ndim: shape.ndim(),
                strides_ndim: strides.ndim(),
            });
        }

        let overflow = || Error::OutOfMemory { size: usize::MAX };
        let numel = shape.checked_numel().ok_or_else(overflow)?;
        let offset = if numel == 0 {
            0
        } else {
            shape
                .iter()
                .zip(strides.iter())
                .filter(|&(_, &stride)| stride < 0)
                .try_fold(0usize, |acc, (&dim, &stride)| {
                    (dim - 1)
                        .checked_mul(stride.unsigned_abs())
                        .and_then(|span| acc.checked_add(span))
                })
                .ok_or_else(overflow)?
        };

        Ok(Self {
            shape,
            strides,
            offset,
        })
    }

    /// Create a scalar (0-dimensional) layout
    pub fn scalar() -> Self {
        Self {
            shape: Shape::scalar(),
            strides: Strides::default(),
            offset: 0,
        }
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the byte strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Get the byte offset of the first logical element
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.numel()
    }

    /// Check if the layout is a scalar (0 dimensions)
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.ndim() == 0
    }

    /// Bytes this layout addresses for elements of `element_size` bytes
    #[inline]
    pub fn required_bytes(&self, element_size: usize) -> usize {
        required_bytes(&self.shape, &self.strides, element_size)
    }

    /// Check if memory is contiguous (row-major order) for `element_size`
    ///
    /// Dimensions of extent 1 are never stepped along, so their stride is
    /// ignored. Layouts with no elements are contiguous.
    pub fn is_contiguous(&self, element_size: usize) -> bool {
        if self.elem_count() == 0 {
            return true;
        }
        if self.offset != 0 {
            return false;
        }

        let expected = Strides::contiguous(&self.shape, element_size);
        self.shape
            .iter()
            .zip(self.strides.iter().zip(expected.iter()))
            .all(|(&dim, (&actual, &wanted))| dim == 1 || actual == wanted)
    }

    /// Normalize a dimension index (handle negative indices)
    pub fn normalize_dim(&self, d: isize) -> Option<usize> {
        let ndim = self.ndim() as isize;
        let idx = if d < 0 { ndim + d } else { d };
        if idx >= 0 && idx < ndim {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Byte position of the element at `indices`, or None if out of bounds
    pub fn byte_offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.ndim() {
            return None;
        }

        let mut position = self.offset as isize;
        for ((&idx, &dim), &stride) in indices.iter().zip(self.shape.iter()).zip(self.strides.iter())
        {
            if idx >= dim {
                return None;
            }
            position += idx as isize * stride;
        }

        Some(position as usize)
    }

    /// Create a transposed layout (swap two dimensions)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Option<Self> {
        let d0 = self.normalize_dim(dim0)?;
        let d1 = self.normalize_dim(dim1)?;

        let mut new_shape = self.shape.clone();
        let mut new_strides = self.strides.clone();

        new_shape.swap(d0, d1);
        new_strides.swap(d0, d1);

        Some(Self {
            shape: new_shape,
            strides: new_strides,
            offset: self.offset,
        })
    }

    /// Create a layout with one dimension reversed
    ///
    /// The origin moves to the last element along `dim` and that stride is
    /// negated; no bytes move.
    pub fn flip(&self, dim: isize) -> Option<Self> {
        let d = self.normalize_dim(dim)?;
        let extent = self.shape[d];
        let stride = self.strides[d];

        let mut new_strides = self.strides.clone();
        new_strides.set(d, -stride);

        let offset = if extent == 0 {
            self.offset
        } else {
            (self.offset as isize + (extent as isize - 1) * stride) as usize
        };

        Some(Self {
            shape: self.shape.clone(),
            strides: new_strides,
            offset,
        })
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {{ shape: {:?}, strides: {:?}, offset: {} }}",
            self.shape.as_slice(),
            self.strides.as_slice(),
            self.offset
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.shape.as_slice())
    }
}
