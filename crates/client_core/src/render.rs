//! Text-only view model for the saved-appointment list.
//!
//! Nodes carry plain strings; front-ends must insert them as text, never as markup.

use shared::protocol::AppointmentRecord;

pub const NO_APPOINTMENTS: &str = "No appointments scheduled yet.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListNode {
    Placeholder(String),
    Record(RecordNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNode {
    pub heading: String,
    pub detail: String,
}

impl RecordNode {
    pub fn from_record(record: &AppointmentRecord) -> Self {
        Self {
            heading: format!("{} - {}", record.department, record.doctor),
            detail: format!("{} | {}", record.date, record.time),
        }
    }
}

/// An empty view means the list has not been loaded yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentListView {
    nodes: Vec<ListNode>,
}

impl AppointmentListView {
    pub fn from_records(records: &[AppointmentRecord]) -> Self {
        if records.is_empty() {
            return Self {
                nodes: vec![ListNode::Placeholder(NO_APPOINTMENTS.to_string())],
            };
        }

        Self {
            nodes: records
                .iter()
                .map(|record| ListNode::Record(RecordNode::from_record(record)))
                .collect(),
        }
    }

    pub fn nodes(&self) -> &[ListNode] {
        &self.nodes
    }

    pub fn is_loaded(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, ListNode::Record(_)))
            .count()
    }

    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.nodes.len() * 2);
        for node in &self.nodes {
            match node {
                ListNode::Placeholder(text) => lines.push(text.clone()),
                ListNode::Record(record) => {
                    lines.push(record.heading.clone());
                    lines.push(format!("  {}", record.detail));
                }
            }
        }
        lines.join("\n")
    }
}
