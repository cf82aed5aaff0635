//! Domain core for the trading-agents dashboard: static pipeline
//! configuration, the normalized event model, and the aggregate state
//! store the driver loop feeds.

pub mod event;
pub mod normalize;
pub mod pipeline;
pub mod store;

pub use event::{Event, Message, ToolCall};
pub use normalize::{normalize_record, Record, REASONING_CATEGORY};
pub use pipeline::{AgentName, AgentStatus, ReportSection, StageTransition, Team};
pub use store::{DashboardState, RingBuffer, Snapshot, DEFAULT_RING_CAPACITY};
