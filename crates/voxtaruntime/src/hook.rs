use crate::{Executed, NodeDef, NodeType, OnExecuted, OnNodeCreated};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Decides which node types an extension applies to
#[derive(Debug, Clone, Default)]
pub struct NodeMatcher {
    exact: Vec<String>,
    phrase: Option<String>,
}

impl NodeMatcher {
    /// Match any of the given canonical identifiers exactly
    pub fn exact<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            exact: names.iter().map(|n| n.as_ref().to_string()).collect(),
            phrase: None,
        }
    }

    /// Also match names containing `phrase`, ignoring case
    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrase = Some(phrase.into().to_lowercase());
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.exact.iter().any(|n| n == name) {
            return true;
        }
        match &self.phrase {
            Some(phrase) => name.to_lowercase().contains(phrase.as_str()),
            None => false,
        }
    }
}

/// Installs extension handlers on matching node types.
///
/// Creation and execution handlers are chained after whatever the node type
/// already carries. Logs once per node type when it first matches and once per
/// node instance on its first execution event.
pub struct NodeHook {
    label: String,
    matcher: NodeMatcher,
    on_node_created: Option<OnNodeCreated>,
    on_executed: Option<OnExecuted>,
    matched_types: Mutex<HashSet<String>>,
}

impl NodeHook {
    pub fn new(label: impl Into<String>, matcher: NodeMatcher) -> Self {
        Self {
            label: label.into(),
            matcher,
            on_node_created: None,
            on_executed: None,
            matched_types: Mutex::new(HashSet::new()),
        }
    }

    pub fn on_node_created(mut self, handler: OnNodeCreated) -> Self {
        self.on_node_created = Some(handler);
        self
    }

    pub fn on_executed(mut self, handler: OnExecuted) -> Self {
        self.on_executed = Some(handler);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, node_data: &NodeDef) -> bool {
        self.matcher.matches(&node_data.name)
    }

    /// Wrap `node_type` when `node_data` is in scope; returns whether it was
    pub fn apply(&self, node_type: &mut NodeType, node_data: &NodeDef) -> bool {
        if !self.matches(node_data) {
            return false;
        }

        if self.matched_types.lock().insert(node_data.name.clone()) {
            info!(extension = %self.label, node = %node_data.name, "Matched target node");
        }

        if let Some(handler) = &self.on_node_created {
            node_type.wrap_on_node_created(handler.clone());
        }

        if let Some(handler) = &self.on_executed {
            let handler = handler.clone();
            let label = self.label.clone();
            let mark = format!("{}:execution_logged", self.label);
            node_type.wrap_on_executed(Arc::new(move |event: &Executed| {
                if event.node.mark_once(&mark) {
                    debug!(
                        extension = %label,
                        node_id = %event.node.id(),
                        message = ?event.message,
                        "onExecuted message received"
                    );
                }
                handler(event);
            }));
        }

        true
    }
}
