//! A runtime that records every device call
//!
//! Memory is real host memory so arrays can be built and dropped normally,
//! but kernels only log their arguments.

use std::sync::{Arc, Mutex};
use stridr::dtype::{DType, Scalar};
use stridr::error::Result;
use stridr::runtime::{Device, Runtime};
use stridr::tensor::Layout;

/// One observed device call
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Allocate(usize),
    Deallocate(usize),
    CopyToDevice(usize),
    CopyFromDevice(usize),
    CopyStrided { shape: Vec<usize>, elem_size: usize },
    Fill { elems: usize, dtype: DType },
    Arange { len: usize, dtype: DType, start: f64, step: f64 },
}

#[derive(Clone, Debug, Default)]
pub struct MockDevice {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Sizes of every allocation request, in order
    pub fn allocations(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Allocate(size) => Some(size),
                _ => None,
            })
            .collect()
    }
}

impl Device for MockDevice {
    fn id(&self) -> usize {
        0
    }

    fn name(&self) -> String {
        "mock".to_string()
    }
}

#[derive(Clone, Debug)]
pub struct MockRuntime;

impl Runtime for MockRuntime {
    type Device = MockDevice;

    fn name() -> &'static str {
        "mock"
    }

    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        device.record(Call::Allocate(size_bytes));
        if size_bytes == 0 {
            return Ok(0);
        }
        let buffer = vec![0u8; size_bytes].into_boxed_slice();
        Ok(Box::into_raw(buffer) as *mut u8 as u64)
    }

    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device) {
        device.record(Call::Deallocate(size_bytes));
        if ptr == 0 || size_bytes == 0 {
            return;
        }
        let raw = std::ptr::slice_from_raw_parts_mut(ptr as *mut u8, size_bytes);
        drop(unsafe { Box::from_raw(raw) });
    }

    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        device.record(Call::CopyToDevice(src.len()));
        if !src.is_empty() {
            unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len()) };
        }
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        device.record(Call::CopyFromDevice(dst.len()));
        if !dst.is_empty() {
            unsafe { std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len()) };
        }
        Ok(())
    }

    fn copy_strided(
        _src_handle: u64,
        _src_byte_offset: usize,
        _dst_handle: u64,
        shape: &[usize],
        _strides: &[isize],
        elem_size: usize,
        device: &Self::Device,
    ) -> Result<()> {
        device.record(Call::CopyStrided {
            shape: shape.to_vec(),
            elem_size,
        });
        Ok(())
    }

    fn fill(
        _dst: u64,
        layout: &Layout,
        dtype: DType,
        _value: Scalar,
        device: &Self::Device,
    ) -> Result<()> {
        device.record(Call::Fill {
            elems: layout.elem_count(),
            dtype,
        });
        Ok(())
    }

    fn arange(
        _dst: u64,
        len: usize,
        dtype: DType,
        start: Scalar,
        step: Scalar,
        device: &Self::Device,
    ) -> Result<()> {
        device.record(Call::Arange {
            len,
            dtype,
            start: start.to_f64(),
            step: step.to_f64(),
        });
        Ok(())
    }

    fn default_device() -> Self::Device {
        MockDevice::new()
    }
}
