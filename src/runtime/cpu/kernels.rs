//! Memory kernels for the CPU backend (strided copy, fill, arange)
//!
//! All strides here are in bytes. Kernels receive a base pointer already
//! advanced to the first logical element, so negative strides walk backwards
//! from it without ever leaving the buffer.

use crate::dtype::Element;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Visit every logical element in row-major order
///
/// Calls `f(linear_index, byte_offset)` where `byte_offset` is relative to
/// the first logical element. A 0-d shape visits one element; a shape with a
/// zero extent visits none.
pub fn for_each_offset(shape: &[usize], strides: &[isize], mut f: impl FnMut(usize, isize)) {
    debug_assert_eq!(shape.len(), strides.len());

    if shape.contains(&0) {
        return;
    }
    if shape.is_empty() {
        f(0, 0);
        return;
    }

    let numel: usize = shape.iter().product();
    let mut indices = vec![0usize; shape.len()];
    let mut offset: isize = 0;

    for linear in 0..numel {
        f(linear, offset);

        // Row-major odometer; keep the running offset in step with the indices
        for dim in (0..shape.len()).rev() {
            indices[dim] += 1;
            offset += strides[dim];
            if indices[dim] < shape[dim] {
                break;
            }
            offset -= strides[dim] * shape[dim] as isize;
            indices[dim] = 0;
        }
    }
}

/// Gather a strided source into a densely packed destination
///
/// # Safety
/// - every `src + offset` visited by [`for_each_offset`] must be readable for
///   `elem_size` bytes
/// - `dst` must be writable for `numel * elem_size` bytes and must not overlap
///   the source elements
pub unsafe fn copy_strided_kernel(
    src: *const u8,
    dst: *mut u8,
    shape: &[usize],
    strides: &[isize],
    elem_size: usize,
) {
    for_each_offset(shape, strides, |linear, offset| unsafe {
        std::ptr::copy_nonoverlapping(
            src.offset(offset),
            dst.add(linear * elem_size),
            elem_size,
        );
    });
}

/// Fill `len` contiguous elements with `value`
///
/// # Safety
/// - `out` must be a valid, aligned pointer to `len` elements
pub unsafe fn fill_kernel<T: Element>(out: *mut T, value: T, len: usize, parallel_min_len: usize) {
    let out_slice = unsafe { std::slice::from_raw_parts_mut(out, len) };

    #[cfg(feature = "rayon")]
    if len >= parallel_min_len {
        out_slice
            .par_chunks_mut(parallel_min_len)
            .for_each(|chunk| chunk.fill(value));
        return;
    }

    #[cfg(not(feature = "rayon"))]
    let _ = parallel_min_len;

    out_slice.fill(value);
}

/// Write `value` to every element reachable through `shape` and byte `strides`
///
/// # Safety
/// - every `base + offset` visited by [`for_each_offset`] must be writable for
///   `size_of::<T>()` bytes
pub unsafe fn fill_strided_kernel<T: Element>(
    base: *mut u8,
    shape: &[usize],
    strides: &[isize],
    value: T,
) {
    // Byte strides need not be multiples of the element size
    for_each_offset(shape, strides, |_, offset| unsafe {
        std::ptr::write_unaligned(base.offset(offset) as *mut T, value);
    });
}

/// Write `value_at(i)` to element `i` of a contiguous buffer
///
/// # Safety
/// - `out` must be a valid, aligned pointer to `len` elements
pub unsafe fn arange_kernel<T: Element>(
    out: *mut T,
    len: usize,
    value_at: impl Fn(usize) -> T + Sync,
    parallel_min_len: usize,
) {
    let out_slice = unsafe { std::slice::from_raw_parts_mut(out, len) };

    #[cfg(feature = "rayon")]
    if len >= parallel_min_len {
        out_slice
            .par_iter_mut()
            .with_min_len(parallel_min_len)
            .enumerate()
            .for_each(|(i, x)| *x = value_at(i));
        return;
    }

    #[cfg(not(feature = "rayon"))]
    let _ = parallel_min_len;

    for (i, x) in out_slice.iter_mut().enumerate() {
        *x = value_at(i);
    }
}
