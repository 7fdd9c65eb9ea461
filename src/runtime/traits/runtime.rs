//! Core trait for compute backends

use crate::dtype::{DType, Scalar};
use crate::error::Result;
use crate::tensor::Layout;

/// Core trait for compute backends
///
/// `Runtime` abstracts over different compute devices (CPU, accelerators).
/// It uses static dispatch via generics, and every call names the device it
/// acts on: there is no ambient "current backend", so several runtimes can be
/// used side by side and a mock runtime can stand in for tests.
///
/// Buffers are identified by an opaque `u64` handle (a pointer on the CPU).
///
/// # Example
///
/// ```ignore
/// let device = CpuRuntime::default_device();
/// let ptr = CpuRuntime::allocate(1024, &device)?;
/// // ... use memory ...
/// CpuRuntime::deallocate(ptr, 1024, &device);
/// ```
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: super::Device;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Allocate device memory
    ///
    /// Returns a handle to `size_bytes` of uninitialized memory.
    /// Returns `Err(OutOfMemory)` if allocation fails.
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64>;

    /// Deallocate device memory
    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device);

    /// Copy data from host to device
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()>;

    /// Copy data from device to host
    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()>;

    /// Materialize a device-resident copy of a host buffer
    ///
    /// The default allocates `src.len()` bytes and copies into them; backends
    /// with a cheaper ingestion path (pinned or mapped memory) override it.
    fn from_host_memory(src: &[u8], device: &Self::Device) -> Result<u64> {
        let ptr = Self::allocate(src.len(), device)?;
        if let Err(err) = Self::copy_to_device(src, ptr, device) {
            Self::deallocate(ptr, src.len(), device);
            return Err(err);
        }
        Ok(ptr)
    }

    /// Copy strided data to a contiguous buffer
    ///
    /// # Parameters
    /// - `src_handle`: Source buffer handle
    /// - `src_byte_offset`: Byte offset of the first logical element
    /// - `dst_handle`: Destination buffer, row-major and densely packed
    /// - `shape`: Shape of the array
    /// - `strides`: Strides of the source array (in bytes)
    /// - `elem_size`: Size of each element in bytes
    #[allow(clippy::too_many_arguments)]
    fn copy_strided(
        src_handle: u64,
        src_byte_offset: usize,
        dst_handle: u64,
        shape: &[usize],
        strides: &[isize],
        elem_size: usize,
        device: &Self::Device,
    ) -> Result<()>;

    /// Write `value` (converted to `dtype`) to every element addressed by `layout`
    fn fill(
        dst: u64,
        layout: &Layout,
        dtype: DType,
        value: Scalar,
        device: &Self::Device,
    ) -> Result<()>;

    /// Populate `len` contiguous elements with `start + i * step`
    ///
    /// `start` and `step` are the caller's values as given: a negative step
    /// produces a descending sequence.
    fn arange(
        dst: u64,
        len: usize,
        dtype: DType,
        start: Scalar,
        step: Scalar,
        device: &Self::Device,
    ) -> Result<()>;

    /// Get the default device
    fn default_device() -> Self::Device;
}
