//! Queue connection management and sinks

pub mod redis;
pub mod sink;

pub use self::redis::{ConnectError, RedisSink};
pub use sink::{ConnectionState, EventSink, MemorySink, PushError, QueueEntry};
