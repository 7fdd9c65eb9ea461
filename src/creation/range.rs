//! Evenly spaced 1-D ranges

use crate::dtype::{DType, DTypeKind, Scalar};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;
use log::debug;

/// Arguments of [`Tensor::arange`]
///
/// Only `stop` is required; `start` defaults to 0 and `step` to 1.
///
/// ```
/// use stridr::creation::ArangeOptions;
/// use stridr::dtype::DType;
///
/// let opts = ArangeOptions::new(10).start(2).step(3).dtype(DType::F32);
/// assert_eq!(opts.resolved_dtype(), DType::F32);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ArangeOptions {
    start: Option<Scalar>,
    stop: Scalar,
    step: Option<Scalar>,
    dtype: Option<DType>,
}

impl ArangeOptions {
    /// Range `[0, stop)` with step 1
    pub fn new(stop: impl Into<Scalar>) -> Self {
        Self {
            start: None,
            stop: stop.into(),
            step: None,
            dtype: None,
        }
    }

    /// First value of the range
    pub fn start(mut self, start: impl Into<Scalar>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Distance between consecutive values; may be negative, never zero
    pub fn step(mut self, step: impl Into<Scalar>) -> Self {
        self.step = Some(step.into());
        self
    }

    /// Element type of the result, overriding inference
    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    fn start_or_default(&self) -> Scalar {
        self.start.unwrap_or(Scalar::from(0i64))
    }

    /// An omitted step shares `stop`'s dtype, so `arange(stop)` keeps it
    fn step_or_default(&self) -> Scalar {
        self.step.unwrap_or(Scalar::new(1.0, self.stop.dtype()))
    }

    /// Element type the range will be created with
    ///
    /// An explicit dtype wins. Otherwise a floating-point start or stop
    /// yields `F64`, and anything else takes the step's dtype.
    pub fn resolved_dtype(&self) -> DType {
        if let Some(dtype) = self.dtype {
            return dtype;
        }

        let any_float = self.start.is_some_and(|s| s.kind() == DTypeKind::Float)
            || self.stop.kind() == DTypeKind::Float;
        if any_float {
            DType::widest_float()
        } else {
            self.step_or_default().dtype()
        }
    }

    /// Validate the arguments and compute dtype and element count
    fn plan(&self) -> Result<(DType, usize)> {
        let step = self.step_or_default();
        if step.is_zero() {
            return Err(Error::invalid_argument("step", "must be non-zero"));
        }

        let mut start = self.start_or_default().to_f64();
        let mut stop = self.stop.to_f64();
        let mut delta = step.to_f64();
        if !(start.is_finite() && stop.is_finite() && delta.is_finite()) {
            return Err(Error::invalid_argument(
                "range",
                format!("bounds and step must be finite, got {start}..{stop} by {delta}"),
            ));
        }

        // Descending ranges have the same count as the ascending mirror
        if delta < 0.0 {
            std::mem::swap(&mut start, &mut stop);
            delta = -delta;
        }
        let len = ((stop - start) / delta).ceil().max(0.0) as usize;

        let dtype = self.resolved_dtype();
        if dtype.is_bool() && len > 2 {
            return Err(Error::dtype_error(
                dtype,
                format!("a boolean range holds at most 2 elements, {len} requested"),
            ));
        }

        Ok((dtype, len))
    }
}

impl<R: Runtime> Tensor<R> {
    /// 1-D array of `start, start + step, …` up to but excluding `stop`
    ///
    /// Fails with `InvalidArgument` for a zero step and `DTypeError` for a
    /// boolean range longer than 2, in both cases before allocating.
    ///
    /// ```
    /// use stridr::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// let t = Tensor::<CpuRuntime>::arange(ArangeOptions::new(0).start(10).step(-3), &device)?;
    /// assert_eq!(t.to_vec::<i32>()?, [10, 7, 4, 1]);
    /// # Ok::<(), stridr::error::Error>(())
    /// ```
    pub fn arange(options: ArangeOptions, device: &R::Device) -> Result<Self> {
        let (dtype, len) = options.plan()?;
        let start = options.start_or_default();
        let step = options.step_or_default();
        debug!("arange {start}..{} by {step} as {dtype}: {len} elements", options.stop);

        let out = Self::empty(&[len], dtype, device)?;
        R::arange(out.storage().ptr(), len, dtype, start, step, device)?;
        Ok(out)
    }

    /// `[0, stop)` with step 1, typed like `stop`
    pub fn arange_to(stop: impl Into<Scalar>, device: &R::Device) -> Result<Self> {
        Self::arange(ArangeOptions::new(stop), device)
    }

    /// `[start, stop)` by `step`, with inferred dtype
    pub fn arange_range(
        start: impl Into<Scalar>,
        stop: impl Into<Scalar>,
        step: impl Into<Scalar>,
        device: &R::Device,
    ) -> Result<Self> {
        Self::arange(ArangeOptions::new(stop).start(start).step(step), device)
    }
}
