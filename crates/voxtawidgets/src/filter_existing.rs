use crate::summary::SummaryController;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use voxtacore::NodeRef;
use voxtaruntime::{AppContext, Executed, Extension, NodeDef, NodeHook, NodeMatcher, NodeType};

pub const FILTER_EXTENSION_NAME: &str = "Voxta.FilterExistingCombinations";

/// Adds an execution summary to the filter-existing-combinations node
pub struct FilterExistingExtension {
    hook: NodeHook,
    observed: Mutex<HashSet<String>>,
}

impl FilterExistingExtension {
    pub fn new() -> Self {
        let matcher = NodeMatcher::exact(&[
            "VoxtaFilterExistingCombinations",
            "Voxta: Filter Existing Combinations",
        ])
        .with_phrase("Filter Existing Combinations");

        let hook = NodeHook::new(FILTER_EXTENSION_NAME, matcher)
            .on_node_created(Arc::new(|node: &NodeRef| {
                SummaryController::ensure_widget(node.as_ref());
            }))
            .on_executed(Arc::new(|event: &Executed| {
                SummaryController::on_executed(event.node.as_ref(), event.message.as_ref());
            }));

        Self {
            hook,
            observed: Mutex::new(HashSet::new()),
        }
    }
}

impl Default for FilterExistingExtension {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extension for FilterExistingExtension {
    fn name(&self) -> &str {
        FILTER_EXTENSION_NAME
    }

    async fn before_register_node_def(
        &self,
        node_type: &mut NodeType,
        node_data: &NodeDef,
        app: &AppContext,
    ) {
        let prefix = &app.config().observe_prefix;
        if !prefix.is_empty()
            && node_data.name.contains(prefix.as_str())
            && self.observed.lock().insert(node_data.name.clone())
        {
            info!(extension = FILTER_EXTENSION_NAME, node = ?node_data, "Observed node registration");
        }

        self.hook.apply(node_type, node_data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{SUMMARY_WIDGET_NAME, WAITING_TEXT};
    use voxtacore::{GraphNode, HostNode};
    use voxtaruntime::ExtensionConfig;

    #[tokio::test]
    async fn test_only_filter_types_are_wrapped() {
        let extension = FilterExistingExtension::new();
        let app = AppContext::new(ExtensionConfig::default());

        let mut filter = NodeType::new("VoxtaFilterExistingCombinations");
        extension
            .before_register_node_def(&mut filter, &NodeDef::new("VoxtaFilterExistingCombinations"), &app)
            .await;
        assert!(filter.on_node_created.is_some());
        assert!(filter.on_executed.is_some());

        let mut other = NodeType::new("VoxtaOutputFolder");
        extension
            .before_register_node_def(&mut other, &NodeDef::new("VoxtaOutputFolder"), &app)
            .await;
        assert!(other.on_node_created.is_none());
        assert!(extension.observed.lock().contains("VoxtaOutputFolder"));
    }

    #[tokio::test]
    async fn test_creation_installs_summary() {
        let extension = FilterExistingExtension::new();
        let app = AppContext::new(ExtensionConfig::default());
        let mut node_type = NodeType::new("Voxta: Filter Existing Combinations");
        extension
            .before_register_node_def(
                &mut node_type,
                &NodeDef::new("Voxta: Filter Existing Combinations"),
                &app,
            )
            .await;

        let node: NodeRef = Arc::new(GraphNode::new("Voxta: Filter Existing Combinations"));
        node_type.node_created(&node);
        node_type.node_created(&node);

        assert_eq!(node.widgets().len(), 1);
        assert_eq!(node.text_value(SUMMARY_WIDGET_NAME), WAITING_TEXT);
    }
}
