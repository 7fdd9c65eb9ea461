//! Array factories: allocation, host ingestion and constant fills

use crate::dtype::{DType, Element, Scalar};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::{Layout, Shape, Storage, Strides, Tensor, checked_required_bytes};
use log::debug;

/// Byte count of a densely packed array, or `OutOfMemory` if it overflows
fn packed_bytes(shape: &Shape, dtype: DType) -> Result<usize> {
    shape
        .checked_numel()
        .and_then(|n| n.checked_mul(dtype.size_in_bytes()))
        .ok_or(Error::OutOfMemory { size: usize::MAX })
}

/// Byte span of a strided layout, or `OutOfMemory` if it overflows
fn footprint(layout: &Layout, dtype: DType) -> Result<usize> {
    checked_required_bytes(layout.shape(), layout.strides(), dtype.size_in_bytes())
        .ok_or(Error::OutOfMemory { size: usize::MAX })
}

impl<R: Runtime> Tensor<R> {
    /// Allocate an uninitialized row-major array
    ///
    /// Requests exactly `numel * element_size` bytes from the device.
    /// Contents are unspecified until written (the CPU backend happens to
    /// zero them).
    ///
    /// ```
    /// use stridr::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// let t = Tensor::<CpuRuntime>::empty(&[2, 3], DType::F32, &device)?;
    /// assert_eq!(t.strides(), &[12, 4]);
    /// assert!(t.is_contiguous());
    /// # Ok::<(), stridr::error::Error>(())
    /// ```
    pub fn empty(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        let shape = Shape::from(shape);
        let size = packed_bytes(&shape, dtype)?;
        let storage = Storage::new(size, device)?;
        debug!("empty {:?} {}: {} bytes on {}", shape, dtype, size, R::name());

        let layout = Layout::contiguous(shape, dtype.size_in_bytes());
        Ok(Self::from_parts(storage, layout, dtype))
    }

    /// Allocate an uninitialized array with explicit byte strides
    ///
    /// The buffer is sized by [`required_bytes`](crate::tensor::required_bytes)
    /// and the origin placed so that negative strides stay inside it.
    pub fn empty_with_strides(
        shape: &[usize],
        dtype: DType,
        strides: &[isize],
        device: &R::Device,
    ) -> Result<Self> {
        let layout = Layout::new(shape, strides)?;
        let size = footprint(&layout, dtype)?;
        let storage = Storage::new(size, device)?;
        debug!("empty {} {}: {} bytes on {}", layout, dtype, size, R::name());

        Ok(Self::from_parts(storage, layout, dtype))
    }

    /// Build an array from host bytes laid out by `strides`
    ///
    /// Exactly the layout's footprint is ingested from the front of `bytes`;
    /// the buffer is not retained. Fails with `InvalidArgument` before
    /// touching the device if `bytes` is shorter than the footprint.
    ///
    /// ```
    /// use stridr::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// let bytes: Vec<u8> = [1i32, 2, 3].iter().flat_map(|v| v.to_ne_bytes()).collect();
    /// let t = Tensor::<CpuRuntime>::from_host_bytes(&[3], DType::I32, &bytes, &[-4], &device)?;
    /// assert_eq!(t.to_vec::<i32>()?, [3, 2, 1]);
    /// # Ok::<(), stridr::error::Error>(())
    /// ```
    pub fn from_host_bytes(
        shape: &[usize],
        dtype: DType,
        bytes: &[u8],
        strides: &[isize],
        device: &R::Device,
    ) -> Result<Self> {
        let layout = Layout::new(shape, strides)?;
        let size = footprint(&layout, dtype)?;
        if bytes.len() < size {
            return Err(Error::invalid_argument(
                "bytes",
                format!(
                    "host buffer holds {} bytes but layout {} needs {}",
                    bytes.len(),
                    layout,
                    size
                ),
            ));
        }

        let storage = Storage::from_host(&bytes[..size], device)?;
        debug!("ingested {} host bytes as {} {} on {}", size, layout, dtype, R::name());

        Ok(Self::from_parts(storage, layout, dtype))
    }

    /// Build a row-major array from a typed host slice
    ///
    /// ```
    /// use stridr::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// let t = Tensor::<CpuRuntime>::from_slice(&[1u16, 2, 3, 4], &[2, 2], &device)?;
    /// assert_eq!(t.dtype(), DType::U16);
    /// # Ok::<(), stridr::error::Error>(())
    /// ```
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize], device: &R::Device) -> Result<Self> {
        let expected = Shape::from(shape).checked_numel();
        if expected != Some(data.len()) {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        let strides = Strides::contiguous(shape, T::DTYPE.size_in_bytes());
        Self::from_host_bytes(shape, T::DTYPE, bytemuck::cast_slice(data), &strides, device)
    }

    /// Row-major array with every element set to `value` converted to `dtype`
    pub fn full(
        shape: &[usize],
        value: impl Into<Scalar>,
        dtype: DType,
        device: &R::Device,
    ) -> Result<Self> {
        let mut tensor = Self::empty(shape, dtype, device)?;
        tensor.fill(value.into())?;
        Ok(tensor)
    }

    /// Like [`full`](Self::full), with the dtype taken from the value
    ///
    /// ```
    /// use stridr::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// let t = Tensor::<CpuRuntime>::full_scalar(&[2], 7i64, &device)?;
    /// assert_eq!(t.dtype(), DType::I64);
    /// assert_eq!(t.to_vec::<i64>()?, [7, 7]);
    /// # Ok::<(), stridr::error::Error>(())
    /// ```
    pub fn full_scalar(
        shape: &[usize],
        value: impl Into<Scalar>,
        device: &R::Device,
    ) -> Result<Self> {
        let value = value.into();
        Self::full(shape, value, value.dtype(), device)
    }

    /// Row-major array of zeros
    pub fn zeros(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        Self::full(shape, Scalar::new(0.0, dtype), dtype, device)
    }

    /// Row-major array of ones (`true` for booleans)
    pub fn ones(shape: &[usize], dtype: DType, device: &R::Device) -> Result<Self> {
        Self::full(shape, Scalar::new(1.0, dtype), dtype, device)
    }
}
