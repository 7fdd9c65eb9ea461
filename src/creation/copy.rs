//! Detaching copies

use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// How [`Tensor::as_constant`] treats the underlying buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyKind {
    /// Share storage and layout with the source
    View,
    /// Pack the elements into a fresh row-major buffer
    Copy,
}

impl<R: Runtime> Tensor<R> {
    /// Detach from derivation history
    ///
    /// The result is a leaf that does not track gradients. With
    /// [`CopyKind::View`] it aliases this array's buffer; with
    /// [`CopyKind::Copy`] it owns a contiguous copy.
    pub fn as_constant(&self, kind: CopyKind) -> Result<Self> {
        match kind {
            CopyKind::View => Ok(self.detached()),
            CopyKind::Copy => self.materialize(),
        }
    }

    /// Contiguous, detached copy with the same shape, dtype and values
    ///
    /// ```
    /// use stridr::prelude::*;
    ///
    /// let device = CpuDevice::new();
    /// let a = Tensor::<CpuRuntime>::from_slice(&[1i8, 2, 3, 4], &[2, 2], &device)?;
    /// let b = a.transpose(0, 1)?.copy()?;
    /// assert!(b.is_contiguous());
    /// assert_eq!(b.to_vec::<i8>()?, [1, 3, 2, 4]);
    /// # Ok::<(), stridr::error::Error>(())
    /// ```
    pub fn copy(&self) -> Result<Self> {
        let out = self.as_constant(CopyKind::Copy)?;
        debug_assert!(out.is_contiguous());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    fn tracked(device: &CpuDevice) -> Tensor<CpuRuntime> {
        let mut t =
            Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2], device)
                .unwrap();
        t.set_requires_grad(true);
        t
    }

    #[test]
    fn test_copy_detaches() {
        let device = CpuDevice::new();
        let source = tracked(&device).flip(0).unwrap();
        assert!(!source.is_leaf());

        let copy = source.copy().unwrap();
        assert!(copy.is_leaf());
        assert!(!copy.requires_grad());
        assert_ne!(copy.id(), source.id());
        assert!(!copy.storage().same_buffer(source.storage()));
    }

    #[test]
    fn test_copy_packs_negative_strides() {
        let device = CpuDevice::new();
        let source = tracked(&device).flip(0).unwrap();
        assert_eq!(source.strides(), &[-16, 8]);

        let copy = source.copy().unwrap();
        assert_eq!(copy.shape(), source.shape());
        assert_eq!(copy.dtype(), DType::F64);
        assert_eq!(copy.strides(), &[16, 8]);
        assert_eq!(copy.to_vec::<f64>().unwrap(), [5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_copy_of_contiguous_is_fresh() {
        let device = CpuDevice::new();
        let source = tracked(&device);
        let mut copy = source.copy().unwrap();

        copy.fill(0.0f64.into()).unwrap();
        assert_eq!(source.to_vec::<f64>().unwrap()[0], 1.0);
    }

    #[test]
    fn test_as_constant_view_shares() {
        let device = CpuDevice::new();
        let source = tracked(&device).transpose(0, 1).unwrap();
        let view = source.as_constant(CopyKind::View).unwrap();

        assert!(view.is_leaf());
        assert!(!view.requires_grad());
        assert!(view.storage().same_buffer(source.storage()));
        assert_eq!(view.strides(), source.strides());
    }
}
