use crate::{AppContext, NodeDef, NodeType};
use async_trait::async_trait;
use std::sync::Arc;

/// A frontend extension, invoked for every node definition before registration
#[async_trait]
pub trait Extension: Send + Sync {
    /// Unique extension name (e.g., "Voxta.OutputFolder")
    fn name(&self) -> &str;

    /// Inspect `node_data` and wrap `node_type`'s handlers when in scope
    async fn before_register_node_def(
        &self,
        node_type: &mut NodeType,
        node_data: &NodeDef,
        app: &AppContext,
    );
}

/// Ordered set of registered extensions
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    /// Register an extension; a second extension with the same name replaces the first
    pub fn register(&mut self, extension: Arc<dyn Extension>) {
        let name = extension.name().to_string();
        tracing::info!("Registering extension: {}", name);
        self.extensions.retain(|e| e.name() != name);
        self.extensions.push(extension);
    }

    /// Names of all registered extensions, in registration order
    pub fn list_extensions(&self) -> Vec<String> {
        self.extensions.iter().map(|e| e.name().to_string()).collect()
    }

    /// Build the node type for `node_data`, letting every extension wrap it in turn
    pub async fn prepare(&self, node_data: &NodeDef, app: &AppContext) -> NodeType {
        let mut node_type = NodeType::new(node_data.name.clone());
        for extension in &self.extensions {
            extension
                .before_register_node_def(&mut node_type, node_data, app)
                .await;
        }
        node_type
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
