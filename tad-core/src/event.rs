use crate::pipeline::{AgentName, AgentStatus, ReportSection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One normalized progress signal.
///
/// A raw record may carry several signals at once; the normalizer
/// decomposes it into a sequence of these. Consumers match exhaustively —
/// a new kind of signal is a new variant, never an optional field on an
/// existing one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    AgentStatusUpdate {
        agent: AgentName,
        status: AgentStatus,
    },
    ReportGenerated {
        section: ReportSection,
        content: String,
    },
    MessageLogged {
        category: String,
        content: String,
    },
    ToolCallLogged {
        tool_name: String,
        args: Map<String, Value>,
    },
}

/// A logged free-text message, as kept in the message ring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub timestamp: String,
    pub category: String,
    pub content: String,
}

/// A logged tool invocation, as kept in the tool-call ring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub timestamp: String,
    pub tool_name: String,
    pub args: Map<String, Value>,
}
