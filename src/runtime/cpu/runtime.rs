//! CPU runtime implementation

use super::device::CpuDevice;
use super::helpers::{dispatch_dtype, encode};
use super::kernels;
use crate::dtype::{DType, Element, Scalar};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Layout;
use log::{debug, trace};
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};

/// Alignment of every CPU allocation (AVX-512 width)
const ALIGN: usize = 64;

/// CPU compute runtime
///
/// This is the default runtime that works on any platform.
/// Memory is allocated on the heap using the system allocator and counted
/// against the device's budget.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;

    fn name() -> &'static str {
        "cpu"
    }

    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        if !device.reserve(size_bytes) {
            debug!(
                "allocation of {} bytes refused: budget {:?}, in use {}",
                size_bytes,
                device.memory_limit(),
                crate::runtime::Device::allocated_bytes(device)
            );
            return Err(Error::OutOfMemory { size: size_bytes });
        }

        let Ok(layout) = AllocLayout::from_size_align(size_bytes, ALIGN) else {
            device.release(size_bytes);
            return Err(Error::OutOfMemory { size: size_bytes });
        };

        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            device.release(size_bytes);
            debug!("system allocator returned null for {size_bytes} bytes");
            return Err(Error::OutOfMemory { size: size_bytes });
        }

        trace!("allocated {} bytes at {:#x}", size_bytes, ptr as u64);
        Ok(ptr as u64)
    }

    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device) {
        if ptr == 0 || size_bytes == 0 {
            return;
        }

        // Only layouts that were successfully allocated reach here
        if let Ok(layout) = AllocLayout::from_size_align(size_bytes, ALIGN) {
            unsafe { dealloc(ptr as *mut u8, layout) };
            device.release(size_bytes);
            trace!("freed {} bytes at {:#x}", size_bytes, ptr);
        }
    }

    fn copy_to_device(src: &[u8], dst: u64, _device: &Self::Device) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        if dst == 0 {
            return Err(Error::Backend("copy into a null buffer".to_string()));
        }

        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len());
        }
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], _device: &Self::Device) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }
        if src == 0 {
            return Err(Error::Backend("copy from a null buffer".to_string()));
        }

        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len());
        }
        Ok(())
    }

    fn copy_strided(
        src_handle: u64,
        src_byte_offset: usize,
        dst_handle: u64,
        shape: &[usize],
        strides: &[isize],
        elem_size: usize,
        _device: &Self::Device,
    ) -> Result<()> {
        if shape.contains(&0) || elem_size == 0 {
            return Ok(());
        }
        if src_handle == 0 || dst_handle == 0 {
            return Err(Error::Backend("strided copy over a null buffer".to_string()));
        }
        if shape.len() != strides.len() {
            return Err(Error::StrideMismatch {
                shape_ndim: shape.len(),
                strides_ndim: strides.len(),
            });
        }

        let src_base = (src_handle as usize + src_byte_offset) as *const u8;
        unsafe {
            kernels::copy_strided_kernel(src_base, dst_handle as *mut u8, shape, strides, elem_size);
        }
        Ok(())
    }

    fn fill(
        dst: u64,
        layout: &Layout,
        dtype: DType,
        value: Scalar,
        device: &Self::Device,
    ) -> Result<()> {
        let len = layout.elem_count();
        if len == 0 {
            return Ok(());
        }
        if dst == 0 {
            return Err(Error::Backend("fill into a null buffer".to_string()));
        }

        let elem_size = dtype.size_in_bytes();
        let base = (dst as usize + layout.offset()) as *mut u8;

        dispatch_dtype!(dtype, T => {
            let x: T = encode(dtype, value);
            let aligned = (base as usize) % std::mem::align_of::<T>() == 0;
            if layout.is_contiguous(elem_size) && aligned {
                unsafe { kernels::fill_kernel(base as *mut T, x, len, device.parallel_min_len()) };
            } else {
                unsafe { kernels::fill_strided_kernel(base, layout.shape(), layout.strides(), x) };
            }
        }, "fill");

        Ok(())
    }

    fn arange(
        dst: u64,
        len: usize,
        dtype: DType,
        start: Scalar,
        step: Scalar,
        device: &Self::Device,
    ) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        if dst == 0 {
            return Err(Error::Backend("arange into a null buffer".to_string()));
        }

        let min_len = device.parallel_min_len();

        dispatch_dtype!(dtype, T => {
            let out = dst as *mut T;
            if dtype.is_float() {
                let (start, step) = (start.to_f64(), step.to_f64());
                unsafe {
                    kernels::arange_kernel(out, len, |i| T::from_f64(start + i as f64 * step), min_len)
                };
            } else {
                // Integers step in their own type: a fractional step truncates first
                let (start, step): (T, T) = (encode(dtype, start), encode(dtype, step));
                let (zero, one) = (T::from_u64(0), T::from_u64(1));
                let is_bool = dtype.is_bool();
                unsafe {
                    kernels::arange_kernel(
                        out,
                        len,
                        |i| {
                            let x = start.offset_by(step, i);
                            if is_bool && x != zero { one } else { x }
                        },
                        min_len,
                    )
                };
            }
        }, "arange");

        Ok(())
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Device;

    #[test]
    fn test_allocate_zero_is_null() {
        let device = CpuDevice::new();
        assert_eq!(CpuRuntime::allocate(0, &device).unwrap(), 0);
        assert_eq!(device.allocated_bytes(), 0);
    }

    #[test]
    fn test_allocate_is_zeroed_and_aligned() {
        let device = CpuDevice::new();
        let ptr = CpuRuntime::allocate(100, &device).unwrap();
        assert_eq!(ptr as usize % ALIGN, 0);
        assert_eq!(device.allocated_bytes(), 100);

        let mut host = vec![1u8; 100];
        CpuRuntime::copy_from_device(ptr, &mut host, &device).unwrap();
        assert!(host.iter().all(|&b| b == 0));

        CpuRuntime::deallocate(ptr, 100, &device);
        assert_eq!(device.allocated_bytes(), 0);
    }

    #[test]
    fn test_allocate_over_budget() {
        let device = CpuDevice::with_memory_limit(64);
        let err = CpuRuntime::allocate(65, &device).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { size: 65 }));
        assert_eq!(device.allocated_bytes(), 0);
    }

    #[test]
    fn test_fill_strided_layout() {
        let device = CpuDevice::new();
        let ptr = CpuRuntime::allocate(24, &device).unwrap();
        // Every other i32 of a 6-element buffer
        let layout = Layout::new([3usize], [8isize]).unwrap();
        CpuRuntime::fill(ptr, &layout, DType::I32, Scalar::from(5i32), &device).unwrap();

        let mut host = [0i32; 6];
        CpuRuntime::copy_from_device(ptr, bytemuck::cast_slice_mut(&mut host), &device).unwrap();
        assert_eq!(host, [5, 0, 5, 0, 5, 0]);

        CpuRuntime::deallocate(ptr, 24, &device);
    }

    #[test]
    fn test_arange_bool_normalizes() {
        let device = CpuDevice::new();
        let ptr = CpuRuntime::allocate(2, &device).unwrap();
        CpuRuntime::arange(ptr, 2, DType::Bool, Scalar::from(0i64), Scalar::from(3i64), &device)
            .unwrap();

        let mut host = [0u8; 2];
        CpuRuntime::copy_from_device(ptr, &mut host, &device).unwrap();
        assert_eq!(host, [0, 1]);

        CpuRuntime::deallocate(ptr, 2, &device);
    }

    #[test]
    fn test_fill_wide_integers_exactly() {
        let device = CpuDevice::new();
        let ptr = CpuRuntime::allocate(16, &device).unwrap();
        let layout = Layout::contiguous(&[2], 8);
        let big = (1i64 << 53) + 1;

        CpuRuntime::fill(ptr, &layout, DType::I64, Scalar::from(big), &device).unwrap();
        let mut signed = [0i64; 2];
        CpuRuntime::copy_from_device(ptr, bytemuck::cast_slice_mut(&mut signed), &device).unwrap();
        assert_eq!(signed, [big, big]);

        CpuRuntime::fill(ptr, &layout, DType::U64, Scalar::from(u64::MAX), &device).unwrap();
        let mut unsigned = [0u64; 2];
        CpuRuntime::copy_from_device(ptr, bytemuck::cast_slice_mut(&mut unsigned), &device).unwrap();
        assert_eq!(unsigned, [u64::MAX, u64::MAX]);

        CpuRuntime::deallocate(ptr, 16, &device);
    }

    #[test]
    fn test_arange_integer_steps_in_element_type() {
        let device = CpuDevice::new();
        let ptr = CpuRuntime::allocate(16, &device).unwrap();

        // 0.5 truncates to 0 under I32 before stepping
        CpuRuntime::arange(ptr, 4, DType::I32, Scalar::from(0i64), Scalar::from(0.5f64), &device)
            .unwrap();
        let mut narrow = [0i32; 4];
        CpuRuntime::copy_from_device(ptr, bytemuck::cast_slice_mut(&mut narrow), &device).unwrap();
        assert_eq!(narrow, [0, 0, 0, 0]);

        let start = (1i64 << 53) + 1;
        CpuRuntime::arange(ptr, 2, DType::I64, Scalar::from(start), Scalar::from(1i64), &device)
            .unwrap();
        let mut wide = [0i64; 2];
        CpuRuntime::copy_from_device(ptr, bytemuck::cast_slice_mut(&mut wide), &device).unwrap();
        assert_eq!(wide, [start, start + 1]);

        CpuRuntime::deallocate(ptr, 16, &device);
    }

    #[test]
    fn test_storage_frees_with_last_clone() {
        use crate::tensor::Storage;

        let device = CpuDevice::new();
        let storage = Storage::<CpuRuntime>::new(32, &device).unwrap();
        let alias = storage.clone();
        assert!(alias.same_buffer(&storage));
        assert_eq!(storage.ref_count(), 2);

        drop(storage);
        assert_eq!(device.allocated_bytes(), 32);
        drop(alias);
        assert_eq!(device.allocated_bytes(), 0);
    }

    #[test]
    fn test_storage_from_ptr_is_borrowed() {
        use crate::tensor::Storage;

        let device = CpuDevice::new();
        let ptr = CpuRuntime::allocate(8, &device).unwrap();
        drop(unsafe { Storage::<CpuRuntime>::from_ptr(ptr, 8, &device) });
        assert_eq!(device.allocated_bytes(), 8);

        CpuRuntime::deallocate(ptr, 8, &device);
    }

    #[test]
    fn test_copy_strided_scalar() {
        let device = CpuDevice::new();
        let src = CpuRuntime::from_host_memory(&42f32.to_ne_bytes(), &device).unwrap();
        let dst = CpuRuntime::allocate(4, &device).unwrap();
        CpuRuntime::copy_strided(src, 0, dst, &[], &[], 4, &device).unwrap();

        let mut host = [0u8; 4];
        CpuRuntime::copy_from_device(dst, &mut host, &device).unwrap();
        assert_eq!(f32::from_ne_bytes(host), 42.0);

        CpuRuntime::deallocate(src, 4, &device);
        CpuRuntime::deallocate(dst, 4, &device);
    }
}
