use crate::{ExtensionRegistry, NodeDef, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use voxtacore::path::DEFAULT_LEAF_NAMES;
use voxtacore::ExtensionError;

/// Hosts extensions and prepares node types for registration
pub struct ExtensionRuntime {
    registry: Arc<ExtensionRegistry>,
    app: AppContext,
}

impl ExtensionRuntime {
    /// Create a runtime with default settings and no extensions
    pub fn new() -> Self {
        Self::with_config(ExtensionConfig::default())
    }

    pub fn with_config(config: ExtensionConfig) -> Self {
        Self::with_registry(ExtensionRegistry::new(), config)
    }

    /// Create a runtime around a pre-populated registry
    pub fn with_registry(registry: ExtensionRegistry, config: ExtensionConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            app: AppContext::new(config),
        }
    }

    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Run every extension against one node definition
    pub async fn prepare_node_type(&self, node_data: &NodeDef) -> NodeType {
        self.registry.prepare(node_data, &self.app).await
    }

    /// Prepare a batch of definitions, keyed by node type name
    pub async fn prepare_all(&self, node_defs: &[NodeDef]) -> HashMap<String, NodeType> {
        let mut prepared = HashMap::new();
        for def in node_defs {
            prepared.insert(def.name.clone(), self.prepare_node_type(def).await);
        }
        prepared
    }
}

impl Default for ExtensionRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Host application handle passed to extensions
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Arc<ExtensionConfig>,
}

impl AppContext {
    pub fn new(config: ExtensionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Arc<ExtensionConfig> {
        &self.config
    }
}

/// How overlapping thumbnail updates on the same node are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOrdering {
    /// Whichever query resolves last overwrites the widget
    #[default]
    LastResolvedWins,
    /// Results of superseded updates are discarded
    LatestIssuedWins,
}

/// Configuration for the extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Origin of the host backend serving the `/voxta/*` routes
    pub base_url: String,
    /// Delay before the first thumbnail update of a new node
    pub initial_update_delay_ms: u64,
    /// Subdirectory names stripped from the end of an output path
    pub known_leaf_names: Vec<String>,
    pub update_ordering: UpdateOrdering,
    /// Node types whose name contains this are logged when first observed
    pub observe_prefix: String,
}

impl ExtensionConfig {
    pub fn from_json(json: &str) -> Result<Self, ExtensionError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExtensionError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ExtensionError::Configuration(format!(
                "base_url must be an http(s) origin, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8188".to_string(),
            initial_update_delay_ms: 100,
            known_leaf_names: DEFAULT_LEAF_NAMES.iter().map(|s| s.to_string()).collect(),
            update_ordering: UpdateOrdering::default(),
            observe_prefix: "Voxta".to_string(),
        }
    }
}
