//! Per-run progress log: append-only observability for booking runs.

pub mod memory;
pub mod ports;

pub use memory::MemoryProgressSink;
pub use ports::ProgressSink;
