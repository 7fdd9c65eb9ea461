//! Storage: device memory management with Arc-based sharing

use crate::error::Result;
use crate::runtime::Runtime;
use std::sync::Arc;

/// A device-resident byte buffer shared between arrays
///
/// Storage is untyped: the dtype and element placement live in the array's
/// layout. Clones share the buffer, and memory is returned to the runtime when
/// the last clone is dropped.
pub struct Storage<R: Runtime> {
    inner: Arc<StorageInner<R>>,
}

struct StorageInner<R: Runtime> {
    /// Raw device pointer (GPU address or CPU ptr cast to u64)
    ptr: u64,
    /// Size of the buffer in bytes
    size_bytes: usize,
    /// Device where memory is allocated
    device: R::Device,
    /// If true, we own this memory and should deallocate on drop
    owned: bool,
}

impl<R: Runtime> Storage<R> {
    /// Allocate `size_bytes` of uninitialized device memory
    pub fn new(size_bytes: usize, device: &R::Device) -> Result<Self> {
        let ptr = R::allocate(size_bytes, device)?;
        Ok(Self::owned(ptr, size_bytes, device))
    }

    /// Copy a host buffer into fresh device memory
    pub fn from_host(data: &[u8], device: &R::Device) -> Result<Self> {
        let ptr = R::from_host_memory(data, device)?;
        Ok(Self::owned(ptr, data.len(), device))
    }

    /// Wrap existing device memory without taking ownership
    ///
    /// # Safety
    /// - `ptr` must point to `size_bytes` of valid device memory
    /// - The memory must remain valid for the lifetime of this Storage
    /// - Caller is responsible for eventual deallocation
    pub unsafe fn from_ptr(ptr: u64, size_bytes: usize, device: &R::Device) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                ptr,
                size_bytes,
                device: device.clone(),
                owned: false,
            }),
        }
    }

    fn owned(ptr: u64, size_bytes: usize, device: &R::Device) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                ptr,
                size_bytes,
                device: device.clone(),
                owned: true,
            }),
        }
    }

    /// Get the raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.size_bytes
    }

    /// Check if storage holds no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.size_bytes == 0
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Get the reference count
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Check if two storages share the same buffer
    #[inline]
    pub fn same_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Runtime> Clone for Storage<R> {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> Drop for StorageInner<R> {
    fn drop(&mut self) {
        if self.owned && self.ptr != 0 {
            R::deallocate(self.ptr, self.size_bytes, &self.device);
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Storage<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &format!("0x{:x}", self.inner.ptr))
            .field("size_bytes", &self.inner.size_bytes)
            .field("owned", &self.inner.owned)
            .field("refs", &Arc::strong_count(&self.inner))
            .finish()
    }
}

// Storage tests live with the CPU runtime (they need a concrete backend)
