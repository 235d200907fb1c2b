//! Durable progress log sink.

pub mod sink;

pub use sink::SqliteProgressSink;
