use crate::event::Event;
use crate::pipeline::{AgentStatus, ReportSection};
use serde_json::Value;
use tracing::debug;

/// One unit pulled from the analysis stream: a loose mapping that may
/// carry a `messages` list (whose entries may nest `tool_calls`) and any
/// number of report-section keys.
pub type Record = Value;

/// Category stamped on messages derived from the stream's reasoning
/// output.
pub const REASONING_CATEGORY: &str = "Reasoning";

/// Decomposes one raw record into an ordered sequence of events.
///
/// Total and deterministic: missing or mistyped fields are "no signal of
/// that kind", never an error. Order within one record is fixed — the last
/// message entry first, its tool calls next, then each report section in
/// declaration order, each immediately followed by its stage-dependency
/// status pair. That ordering keeps the derived current report and the
/// status map mutually consistent at every intermediate point.
pub fn normalize_record(record: &Record) -> Vec<Event> {
    let mut events = Vec::new();
    let Some(fields) = record.as_object() else {
        debug!("dropping non-mapping record");
        return events;
    };

    if let Some(messages) = fields.get("messages").and_then(Value::as_array) {
        if let Some(last) = messages.last() {
            if let Some(content) = last.get("content") {
                events.push(Event::MessageLogged {
                    category: REASONING_CATEGORY.to_string(),
                    content: coerce_content(content),
                });
            }
            if let Some(calls) = last.get("tool_calls").and_then(Value::as_array) {
                for call in calls {
                    let Some(name) = call.get("name").and_then(Value::as_str) else {
                        debug!("dropping tool call without a name");
                        continue;
                    };
                    let args = call
                        .get("args")
                        .and_then(Value::as_object)
                        .cloned()
                        .unwrap_or_default();
                    events.push(Event::ToolCallLogged {
                        tool_name: name.to_string(),
                        args,
                    });
                }
            }
        }
    }

    for section in ReportSection::ALL {
        let Some(content) = fields.get(section.key()).and_then(Value::as_str) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }
        events.push(Event::ReportGenerated {
            section,
            content: content.to_string(),
        });
        let transition = section.stage_transition();
        events.push(Event::AgentStatusUpdate {
            agent: transition.completes,
            status: AgentStatus::Completed,
        });
        if let Some(next) = transition.starts {
            events.push(Event::AgentStatusUpdate {
                agent: next,
                status: AgentStatus::InProgress,
            });
        }
    }

    events
}

/// Text extraction for message content: strings pass through, sequences
/// join their items' renderings with a single space, anything else renders
/// as-is.
fn coerce_content(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(render_item)
            .collect::<Vec<_>>()
            .join(" "),
        other => render_item(other),
    }
}

fn render_item(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
