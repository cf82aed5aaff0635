use crate::event::{Event, Message, ToolCall};
use crate::pipeline::{AgentName, AgentStatus, ReportSection};
use chrono::Local;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

pub const DEFAULT_RING_CAPACITY: usize = 100;

/// Bounded FIFO log. Pushing beyond capacity evicts the oldest entry, so
/// memory stays constant no matter how long the stream runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            items: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// The single mutable dashboard aggregate. Exactly one writer (the driver
/// loop) mutates it through `apply`; everyone else reads completed
/// `Snapshot` copies.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    statuses: BTreeMap<AgentName, AgentStatus>,
    sections: BTreeMap<ReportSection, String>,
    messages: RingBuffer<Message>,
    tool_calls: RingBuffer<ToolCall>,
    current_agent: Option<AgentName>,
    current_report: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::with_config(&AgentName::ALL, DEFAULT_RING_CAPACITY)
    }

    /// Builds a store tracking only `roster`. Status updates for agents
    /// outside it are no-ops, which is how an operator-selected analyst
    /// subset stays a closed roster at runtime.
    pub fn with_config(roster: &[AgentName], ring_capacity: usize) -> Self {
        Self {
            statuses: roster
                .iter()
                .map(|agent| (*agent, AgentStatus::default()))
                .collect(),
            sections: BTreeMap::new(),
            messages: RingBuffer::new(ring_capacity),
            tool_calls: RingBuffer::new(ring_capacity),
            current_agent: None,
            current_report: None,
        }
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::AgentStatusUpdate { agent, status } => self.update_status(agent, status),
            Event::ReportGenerated { section, content } => self.update_section(section, content),
            Event::MessageLogged { category, content } => self.messages.push(Message {
                timestamp: wall_clock_stamp(),
                category,
                content,
            }),
            Event::ToolCallLogged { tool_name, args } => self.tool_calls.push(ToolCall {
                timestamp: wall_clock_stamp(),
                tool_name,
                args,
            }),
        }
    }

    fn update_status(&mut self, agent: AgentName, status: AgentStatus) {
        let Some(current) = self.statuses.get_mut(&agent) else {
            debug!(agent = agent.label(), "status update outside roster, ignoring");
            return;
        };
        let accepted = match (*current, status) {
            (from, to) if from == to => false,
            (AgentStatus::Error, _) => false,
            (_, AgentStatus::Error) => true,
            // Forward movement only: pending -> in_progress -> completed.
            (from, to) => to > from,
        };
        if !accepted {
            return;
        }
        *current = status;
        self.current_agent = Some(agent);
    }

    fn update_section(&mut self, section: ReportSection, content: String) {
        self.sections.insert(section, content);
        self.current_report = if self.sections.contains_key(&ReportSection::FinalTradeDecision) {
            Some(assemble_report(&self.sections))
        } else {
            self.sections.get(&section).cloned()
        };
    }

    /// End-of-stream reconciliation: every stage still pending or running
    /// is nominally finished. Errors stay put and the current-agent pointer
    /// is left on whoever last changed during the run.
    pub fn finalize(&mut self) {
        for status in self.statuses.values_mut() {
            if matches!(*status, AgentStatus::Pending | AgentStatus::InProgress) {
                *status = AgentStatus::Completed;
            }
        }
    }

    pub fn current_agent(&self) -> Option<AgentName> {
        self.current_agent
    }

    /// Point-in-time copy, independent of the live aggregate. Taken once
    /// per render cycle, only between fully applied records, so a reader
    /// can never observe a torn state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            agents: self.statuses.clone(),
            sections: self.sections.clone(),
            messages: self.messages.iter().cloned().collect(),
            tool_calls: self.tool_calls.iter().cloned().collect(),
            current_agent: self.current_agent,
            current_report: self.current_report.clone(),
        }
    }
}

/// Immutable copy of the aggregate handed to renderers and exporters.
/// Carries no presentation markup; styling is the renderer's business.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Snapshot {
    pub agents: BTreeMap<AgentName, AgentStatus>,
    pub sections: BTreeMap<ReportSection, String>,
    pub messages: Vec<Message>,
    pub tool_calls: Vec<ToolCall>,
    pub current_agent: Option<AgentName>,
    pub current_report: Option<String>,
}

impl Snapshot {
    pub fn status(&self, agent: AgentName) -> Option<AgentStatus> {
        self.agents.get(&agent).copied()
    }

    pub fn section(&self, section: ReportSection) -> Option<&str> {
        self.sections.get(&section).map(String::as_str)
    }

    /// All set sections concatenated in declaration order, or `None` when
    /// nothing has been produced yet.
    pub fn assembled_report(&self) -> Option<String> {
        if self.sections.is_empty() {
            None
        } else {
            Some(assemble_report(&self.sections))
        }
    }
}

fn assemble_report(sections: &BTreeMap<ReportSection, String>) -> String {
    ReportSection::ALL
        .into_iter()
        .filter_map(|section| {
            sections
                .get(&section)
                .map(|content| format!("## {}\n\n{}", section.title(), content))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn wall_clock_stamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
