//! CPU device implementation

use crate::runtime::Device;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default element count below which CPU kernels stay single-threaded
pub const DEFAULT_PARALLEL_MIN_LEN: usize = 1 << 14;

/// CPU device (there's only one: the host CPU)
///
/// The handle carries the backend configuration: an optional allocation
/// budget and the parallelism threshold for kernels. Clones share one usage
/// counter, so every array allocated through a handle (or its clones) counts
/// against the same budget.
///
/// ```
/// use stridr::runtime::Device;
/// use stridr::runtime::cpu::CpuDevice;
///
/// let device = CpuDevice::with_memory_limit(1 << 20);
/// assert_eq!(device.memory_limit(), Some(1 << 20));
/// assert_eq!(device.allocated_bytes(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct CpuDevice {
    id: usize,
    memory_limit: Option<usize>,
    parallel_min_len: usize,
    allocated: Arc<AtomicUsize>,
}

impl CpuDevice {
    /// Create a new CPU device with no allocation budget
    pub fn new() -> Self {
        Self {
            id: 0,
            memory_limit: None,
            parallel_min_len: DEFAULT_PARALLEL_MIN_LEN,
            allocated: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a CPU device that refuses allocations beyond `limit_bytes` in total
    pub fn with_memory_limit(limit_bytes: usize) -> Self {
        Self {
            memory_limit: Some(limit_bytes),
            ..Self::new()
        }
    }

    /// Set the element count below which kernels run single-threaded
    pub fn with_parallel_min_len(mut self, min_len: usize) -> Self {
        self.parallel_min_len = min_len.max(1);
        self
    }

    /// Allocation budget in bytes, if any
    #[inline]
    pub fn memory_limit(&self) -> Option<usize> {
        self.memory_limit
    }

    /// Element count below which kernels stay single-threaded
    #[inline]
    pub fn parallel_min_len(&self) -> usize {
        self.parallel_min_len
    }

    /// Reserve `size_bytes` against the budget; false if it would be exceeded
    pub(super) fn reserve(&self, size_bytes: usize) -> bool {
        self.allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let next = current.checked_add(size_bytes)?;
                match self.memory_limit {
                    Some(limit) if next > limit => None,
                    _ => Some(next),
                }
            })
            .is_ok()
    }

    /// Return `size_bytes` to the budget
    pub(super) fn release(&self, size_bytes: usize) {
        self.allocated.fetch_sub(size_bytes, Ordering::AcqRel);
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        "cpu".to_string()
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }
}
