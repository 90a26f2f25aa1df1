//! Execution summary display for the filter node.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use voxtacore::message::{
    collect_candidates, display_value, find_ui_candidate, first_or_scalar, join_values,
    CANDIDATE_PROBES,
};
use voxtacore::{HostNode, TextWidget};

pub const SUMMARY_WIDGET_NAME: &str = "Summary";
/// Name used by earlier releases, renamed on sight
pub const LEGACY_SUMMARY_WIDGET_NAME: &str = "execution_summary_widget";

pub const WAITING_TEXT: &str = "Waiting for execution...";
pub const NO_PAYLOAD_TEXT: &str = "(No UI payload yet)";
pub const SUMMARY_MISSING_TEXT: &str = "(Summary missing in UI payload)";

/// What an execution message boils down to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// No candidate carried any ui-like field
    NoPayload,
    /// A ui-like candidate was found but its summary is empty
    SummaryMissing,
    Ready(String),
}

impl SummaryOutcome {
    pub fn text(&self) -> &str {
        match self {
            SummaryOutcome::NoPayload => NO_PAYLOAD_TEXT,
            SummaryOutcome::SummaryMissing => SUMMARY_MISSING_TEXT,
            SummaryOutcome::Ready(text) => text,
        }
    }
}

/// Derive the display outcome from a raw execution message
pub fn summarize(message: Option<&Value>) -> SummaryOutcome {
    let candidates = collect_candidates(message, CANDIDATE_PROBES);
    match find_ui_candidate(&candidates) {
        Some(ui) => summarize_candidate(ui),
        None => SummaryOutcome::NoPayload,
    }
}

/// Format one ui-like object
pub fn summarize_candidate(ui: &Value) -> SummaryOutcome {
    let summary = match ui.get("summary") {
        Some(Value::Array(parts)) => join_values(parts, " "),
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    };
    if summary.is_empty() {
        return SummaryOutcome::SummaryMissing;
    }

    let count = |field: &str| {
        first_or_scalar(ui.get(field))
            .map(display_value)
            .unwrap_or_else(|| "?".to_string())
    };

    SummaryOutcome::Ready(format!(
        "{} (Skipped: {}, Kept: {})",
        summary,
        count("skipped"),
        count("kept")
    ))
}

/// Owns the Summary text widget of a node
pub struct SummaryController;

impl SummaryController {
    /// Find or create the node's Summary widget.
    ///
    /// A widget still carrying the legacy name is renamed in place, keeping its
    /// value. Safe to call on every creation and execution event.
    pub fn ensure_widget(node: &dyn HostNode) -> Arc<TextWidget> {
        match node.find_text_widget(&[SUMMARY_WIDGET_NAME, LEGACY_SUMMARY_WIDGET_NAME]) {
            Some(widget) => {
                if widget.name() == LEGACY_SUMMARY_WIDGET_NAME {
                    widget.set_name(SUMMARY_WIDGET_NAME);
                }
                widget
            }
            None => {
                let widget = node.add_text_widget(SUMMARY_WIDGET_NAME, WAITING_TEXT);
                widget.set_serialize(false);
                widget
            }
        }
    }

    /// Update the Summary widget from an execution message and request a redraw
    pub fn on_executed(node: &dyn HostNode, message: Option<&Value>) -> SummaryOutcome {
        let widget = Self::ensure_widget(node);
        let outcome = summarize(message);

        match &outcome {
            SummaryOutcome::NoPayload => {
                let candidates = collect_candidates(message, CANDIDATE_PROBES);
                debug!(
                    node_id = %node.id(),
                    candidates = ?candidates,
                    "No UI-like payload found"
                );
            }
            SummaryOutcome::SummaryMissing => {
                let candidates = collect_candidates(message, CANDIDATE_PROBES);
                debug!(
                    node_id = %node.id(),
                    ui = ?find_ui_candidate(&candidates),
                    "UI payload present but summary missing or empty"
                );
            }
            SummaryOutcome::Ready(_) => {}
        }

        widget.set_value(outcome.text());
        node.set_dirty_canvas(true, true);
        outcome
    }
}
