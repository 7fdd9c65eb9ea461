//! Common test utilities
#![allow(dead_code)]

pub mod mock;

use stridr::runtime::cpu::CpuDevice;

/// Install a test logger once per binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create a CPU device for testing
pub fn create_cpu_device() -> CpuDevice {
    init_logging();
    CpuDevice::new()
}

/// Native-endian bytes of a typed slice
pub fn host_bytes<T: bytemuck::Pod>(values: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}
