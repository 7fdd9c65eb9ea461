//! Trait for device handles

/// Handle naming one compute unit of a runtime
///
/// Handles are cheap to clone and are passed explicitly to every runtime call.
/// Per-device configuration (memory budgets, parallelism thresholds) lives on
/// the concrete handle type.
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device within its runtime
    fn id(&self) -> usize;

    /// Check if two handles refer to the same device
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("Device({})", self.id())
    }

    /// Bytes currently allocated through this device
    ///
    /// Backends that do not track usage report 0.
    fn allocated_bytes(&self) -> usize {
        0
    }
}
