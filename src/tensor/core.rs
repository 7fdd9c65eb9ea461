//! Core Tensor type

use super::{GradNode, Layout, Storage, TensorId};
use crate::dtype::{DType, Scalar};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use log::trace;
use std::fmt;
use std::sync::Arc;

/// N-dimensional array stored on a compute device
///
/// `Tensor` is the fundamental data structure in stridr. It consists of:
/// - **Storage**: Reference-counted device memory (records its device)
/// - **Layout**: Shape, byte strides, and offset defining the view into storage
/// - **DType**: Element type (determined at runtime)
/// - **Derivation**: an optional [`GradNode`] plus a `requires_grad` flag
///
/// # Zero-Copy Views
///
/// `transpose` and `flip` create new arrays that share the same underlying
/// storage through a modified layout. Views of a tracked array record a
/// `GradNode` pointing back at it.
///
/// # Example
///
/// ```
/// use stridr::prelude::*;
///
/// let device = CpuDevice::new();
/// let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device)?;
/// let b = a.transpose(-1, -2)?; // Zero-copy, shares storage with a
/// assert!(!b.is_contiguous());
/// assert_eq!(b.to_vec::<f32>()?, [1.0, 3.0, 2.0, 4.0]);
/// # Ok::<(), stridr::error::Error>(())
/// ```
pub struct Tensor<R: Runtime> {
    /// Unique ID for derivation tracking
    id: TensorId,
    /// Device memory
    storage: Storage<R>,
    /// Shape, strides, offset
    layout: Layout,
    /// Element type
    dtype: DType,
    /// Whether derivations of this array are recorded
    requires_grad: bool,
    /// How this array was computed, if it was
    grad_node: Option<Arc<GradNode>>,
}

impl<R: Runtime> Tensor<R> {
    /// Create a leaf array from storage, layout and dtype
    ///
    /// The storage must hold every byte the layout can reach.
    pub fn from_parts(storage: Storage<R>, layout: Layout, dtype: DType) -> Self {
        debug_assert!(
            layout.elem_count() == 0
                || layout.required_bytes(dtype.size_in_bytes()) <= storage.size_in_bytes(),
            "storage of {} bytes cannot back layout {}",
            storage.size_in_bytes(),
            layout
        );

        Self {
            id: TensorId::new(),
            storage,
            layout,
            dtype,
            requires_grad: false,
            grad_node: None,
        }
    }

    /// Derived view over the same storage
    fn derive(&self, op: &'static str, layout: Layout) -> Self {
        let grad_node = self
            .requires_grad
            .then(|| Arc::new(GradNode::new(op, vec![(self.id, self.grad_node.clone())])));

        Self {
            id: TensorId::new(),
            storage: self.storage.clone(),
            layout,
            dtype: self.dtype,
            requires_grad: self.requires_grad,
            grad_node,
        }
    }

    // ===== Accessors =====

    /// Get the tensor ID
    #[inline]
    pub fn id(&self) -> TensorId {
        self.id
    }

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides (in bytes)
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Check if the tensor is contiguous in memory
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous(self.dtype.size_in_bytes())
    }

    /// Check if this is a scalar (0-dimensional tensor)
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.layout.is_scalar()
    }

    // ===== Derivation tracking =====

    /// Whether derivations of this array are recorded
    #[inline]
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Turn derivation recording on or off for this handle
    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }

    /// Record of the operation that produced this array
    #[inline]
    pub fn grad_node(&self) -> Option<&Arc<GradNode>> {
        self.grad_node.as_ref()
    }

    /// True unless this array was computed from another tracked array
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.grad_node.is_none()
    }

    /// Drop derivation history, keeping storage and layout
    pub(crate) fn detached(&self) -> Self {
        Self {
            id: TensorId::new(),
            storage: self.storage.clone(),
            layout: self.layout.clone(),
            dtype: self.dtype,
            requires_grad: false,
            grad_node: None,
        }
    }

    // ===== View Operations (Zero-Copy) =====

    /// Transpose two dimensions (zero-copy)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let new_layout =
            self.layout
                .transpose(dim0, dim1)
                .ok_or_else(|| Error::InvalidDimension {
                    dim: if self.layout.normalize_dim(dim0).is_none() {
                        dim0
                    } else {
                        dim1
                    },
                    ndim: self.ndim(),
                })?;

        Ok(self.derive("transpose", new_layout))
    }

    /// Reverse the order of elements along a dimension (zero-copy)
    ///
    /// Negates the dimension's stride and moves the origin to the far end, so
    /// the result has a negative stride.
    pub fn flip(&self, dim: isize) -> Result<Self> {
        let new_layout = self.layout.flip(dim).ok_or(Error::InvalidDimension {
            dim,
            ndim: self.ndim(),
        })?;

        Ok(self.derive("flip", new_layout))
    }

    // ===== Data movement =====

    /// Write `value`, converted to this array's dtype, to every element
    ///
    /// Only the elements addressed by the layout are touched; other bytes of
    /// a shared buffer are left alone.
    pub fn fill(&mut self, value: Scalar) -> Result<()> {
        trace!(
            "fill {} {} with {:?}",
            self.dtype,
            self.layout,
            value
        );
        R::fill(
            self.storage.ptr(),
            &self.layout,
            self.dtype,
            value.cast(self.dtype),
            self.storage.device(),
        )
    }

    /// Densely packed copy of the elements in row-major order
    ///
    /// The result is a fresh leaf on the same device; it does not inherit
    /// derivation history.
    pub(crate) fn materialize(&self) -> Result<Self> {
        let elem_size = self.dtype.size_in_bytes();
        let size = self
            .numel()
            .checked_mul(elem_size)
            .ok_or(Error::OutOfMemory { size: usize::MAX })?;
        let device = self.storage.device();

        let new_storage = Storage::new(size, device)?;
        R::copy_strided(
            self.storage.ptr(),
            self.layout.offset(),
            new_storage.ptr(),
            self.shape(),
            self.strides(),
            elem_size,
            device,
        )?;

        Ok(Self::from_parts(
            new_storage,
            Layout::contiguous(self.shape(), elem_size),
            self.dtype,
        ))
    }

    /// Make tensor contiguous (copy if needed)
    ///
    /// If the tensor is already contiguous, returns a view (zero-copy).
    /// Otherwise, allocates new storage and copies the data to a contiguous
    /// layout; a tracked source yields a tracked result.
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }

        let mut out = self.materialize()?;
        if self.requires_grad {
            out.requires_grad = true;
            out.grad_node = Some(Arc::new(GradNode::new(
                "contiguous",
                vec![(self.id, self.grad_node.clone())],
            )));
        }
        Ok(out)
    }

    /// Copy tensor data to a Vec on the host, in row-major order
    ///
    /// `T` must have the same size as the array's elements (boolean arrays
    /// read back as `u8`). Non-contiguous arrays are packed first.
    pub fn to_vec<T: bytemuck::Pod>(&self) -> Result<Vec<T>> {
        let elem_size = self.dtype.size_in_bytes();
        if std::mem::size_of::<T>() != elem_size {
            return Err(Error::dtype_error(
                self.dtype,
                format!(
                    "cannot read {}-byte elements as a {}-byte type",
                    elem_size,
                    std::mem::size_of::<T>()
                ),
            ));
        }

        let packed;
        let source = if self.is_contiguous() {
            self
        } else {
            packed = self.materialize()?;
            &packed
        };

        // Allocate with T's alignment, then view as bytes for the copy
        let mut result = vec![T::zeroed(); source.numel()];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
        if !bytes.is_empty() {
            let src_ptr = source.storage.ptr() + source.layout.offset() as u64;
            R::copy_from_device(src_ptr, bytes, source.storage.device())?;
        }
        Ok(result)
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    /// Clone creates a new handle sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        Self {
            id: TensorId::new(),
            storage: self.storage.clone(),
            layout: self.layout.clone(),
            dtype: self.dtype,
            requires_grad: self.requires_grad,
            grad_node: self.grad_node.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("dtype", &self.dtype)
            .field("contiguous", &self.is_contiguous())
            .field("requires_grad", &self.requires_grad)
            .finish()
    }
}

impl<R: Runtime> fmt::Display for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({:?}, dtype={})", self.shape(), self.dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn matrix(device: &CpuDevice) -> Tensor<CpuRuntime> {
        // [[1, 2, 3], [4, 5, 6]]
        Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], device)
            .unwrap()
    }

    #[test]
    fn test_from_parts_is_leaf() {
        let device = CpuDevice::new();
        let tensor = matrix(&device);

        assert_eq!(tensor.shape(), &[2, 3]);
        assert_eq!(tensor.strides(), &[12, 4]);
        assert_eq!(tensor.dtype(), DType::F32);
        assert!(tensor.is_contiguous());
        assert!(tensor.is_leaf());
        assert!(!tensor.requires_grad());
    }

    #[test]
    fn test_transpose() {
        let device = CpuDevice::new();
        let transposed = matrix(&device).transpose(0, 1).unwrap();

        assert_eq!(transposed.shape(), &[3, 2]);
        assert_eq!(transposed.strides(), &[4, 12]);
        assert!(!transposed.is_contiguous());
        assert_eq!(
            transposed.to_vec::<f32>().unwrap(),
            [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]
        );
    }

    #[test]
    fn test_transpose_invalid_dim() {
        let device = CpuDevice::new();
        let err = matrix(&device).transpose(0, 5).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { dim: 5, ndim: 2 }));
    }

    #[test]
    fn test_flip_reads_reversed() {
        let device = CpuDevice::new();
        let flipped = matrix(&device).flip(-1).unwrap();

        assert_eq!(flipped.strides(), &[12, -4]);
        assert_eq!(flipped.to_vec::<f32>().unwrap(), [3.0, 2.0, 1.0, 6.0, 5.0, 4.0]);
    }

    #[test]
    fn test_contiguous_from_transpose() {
        let device = CpuDevice::new();
        let tensor = matrix(&device);
        let packed = tensor.transpose(0, 1).unwrap().contiguous().unwrap();

        assert!(packed.is_contiguous());
        assert!(!packed.storage().same_buffer(tensor.storage()));
        assert_eq!(packed.to_vec::<f32>().unwrap(), [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_contiguous_shares_when_already_packed() {
        let device = CpuDevice::new();
        let tensor = matrix(&device);
        let same = tensor.contiguous().unwrap();
        assert!(same.storage().same_buffer(tensor.storage()));
    }

    #[test]
    fn test_views_of_tracked_record_nodes() {
        let device = CpuDevice::new();
        let mut tensor = matrix(&device);
        tensor.set_requires_grad(true);

        let view = tensor.transpose(0, 1).unwrap().flip(0).unwrap();
        assert!(view.requires_grad());
        assert!(!view.is_leaf());

        let node = view.grad_node().unwrap();
        assert_eq!(node.op(), "flip");
        assert_eq!(node.depth(), 2);
        assert!(node.depends_on(tensor.id()));
    }

    #[test]
    fn test_views_of_untracked_stay_leaves() {
        let device = CpuDevice::new();
        let view = matrix(&device).flip(0).unwrap();
        assert!(view.is_leaf());
    }

    #[test]
    fn test_fill_view_touches_only_viewed_elements() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::zeros(&[4], DType::I32, &device).unwrap();
        // Every other element of the same buffer
        let layout = Layout::new([2usize], [8isize]).unwrap();
        let mut view = Tensor::from_parts(tensor.storage().clone(), layout, DType::I32);

        view.fill(Scalar::from(9i32)).unwrap();
        assert_eq!(tensor.to_vec::<i32>().unwrap(), [9, 0, 9, 0]);
    }

    #[test]
    fn test_fill_converts_value() {
        let device = CpuDevice::new();
        let mut tensor = Tensor::<CpuRuntime>::empty(&[3], DType::I16, &device).unwrap();
        tensor.fill(Scalar::from(2.9f64)).unwrap();
        assert_eq!(tensor.to_vec::<i16>().unwrap(), [2, 2, 2]);
    }

    #[test]
    fn test_to_vec_size_mismatch() {
        let device = CpuDevice::new();
        let err = matrix(&device).to_vec::<f64>().unwrap_err();
        assert!(matches!(err, Error::DTypeError { dtype: DType::F32, .. }));
    }

    #[test]
    fn test_to_vec_empty() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::empty(&[0, 3], DType::F64, &device).unwrap();
        assert!(tensor.to_vec::<f64>().unwrap().is_empty());
    }
}
