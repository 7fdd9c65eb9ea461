//! Factories shaped after an existing array

use crate::dtype::Scalar;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Only the template's shape and dtype are read; results are always
/// row-major, whatever the template's strides.
impl<R: Runtime> Tensor<R> {
    /// Uninitialized array with the template's shape and dtype, on its device
    pub fn empty_like(template: &Self) -> Result<Self> {
        Self::empty_like_on(template, template.device())
    }

    /// Like [`empty_like`](Self::empty_like), on an explicit device
    pub fn empty_like_on(template: &Self, device: &R::Device) -> Result<Self> {
        Self::empty(template.shape(), template.dtype(), device)
    }

    /// Array with the template's shape and dtype, every element `value`
    pub fn full_like(template: &Self, value: impl Into<Scalar>) -> Result<Self> {
        Self::full_like_on(template, value, template.device())
    }

    /// Like [`full_like`](Self::full_like), on an explicit device
    pub fn full_like_on(
        template: &Self,
        value: impl Into<Scalar>,
        device: &R::Device,
    ) -> Result<Self> {
        Self::full(template.shape(), value, template.dtype(), device)
    }

    /// Zeros with the template's shape and dtype
    pub fn zeros_like(template: &Self) -> Result<Self> {
        Self::zeros_like_on(template, template.device())
    }

    /// Like [`zeros_like`](Self::zeros_like), on an explicit device
    pub fn zeros_like_on(template: &Self, device: &R::Device) -> Result<Self> {
        Self::zeros(template.shape(), template.dtype(), device)
    }

    /// Ones with the template's shape and dtype
    pub fn ones_like(template: &Self) -> Result<Self> {
        Self::ones_like_on(template, template.device())
    }

    /// Like [`ones_like`](Self::ones_like), on an explicit device
    pub fn ones_like_on(template: &Self, device: &R::Device) -> Result<Self> {
        Self::ones(template.shape(), template.dtype(), device)
    }
}
