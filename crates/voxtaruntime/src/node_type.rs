use serde::{Deserialize, Serialize};
use serde_json::Value;
use voxtacore::{compose, Handler, NodeRef};

/// Node definition the host hands to extensions before registering a type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeDef {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NodeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            category: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Node types shipped by the Voxta backend package
    pub fn voxta_catalog() -> Vec<NodeDef> {
        [
            ("VoxtaExportCharacter", "Voxta: Export Character"),
            ("VoxtaFilterExistingCombinations", "Voxta: Filter Existing Combinations"),
            ("VoxtaOutputFolder", "Voxta: Output Folder"),
        ]
        .into_iter()
        .map(|(name, display)| NodeDef::new(name).with_display_name(display).with_category("Voxta"))
        .collect()
    }
}

/// Payload of an execution-complete event
#[derive(Clone)]
pub struct Executed {
    pub node: NodeRef,
    /// Raw message as delivered; shape varies between host versions
    pub message: Option<Value>,
}

pub type OnNodeCreated = Handler<NodeRef>;
pub type OnExecuted = Handler<Executed>;

/// Lifecycle handlers of one registered node type.
///
/// Extensions never replace a handler; they wrap it so every extension
/// layered on the same type keeps running.
#[derive(Clone)]
pub struct NodeType {
    pub name: String,
    pub on_node_created: Option<OnNodeCreated>,
    pub on_executed: Option<OnExecuted>,
}

impl NodeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_node_created: None,
            on_executed: None,
        }
    }

    pub fn wrap_on_node_created(&mut self, extension: OnNodeCreated) {
        self.on_node_created = Some(compose(self.on_node_created.take(), extension));
    }

    pub fn wrap_on_executed(&mut self, extension: OnExecuted) {
        self.on_executed = Some(compose(self.on_executed.take(), extension));
    }

    /// Fire the creation handlers for a freshly instantiated node
    pub fn node_created(&self, node: &NodeRef) {
        if let Some(handler) = &self.on_node_created {
            handler(node);
        }
    }

    /// Fire the execution handlers with the raw backend message
    pub fn executed(&self, node: &NodeRef, message: Option<Value>) {
        if let Some(handler) = &self.on_executed {
            handler(&Executed {
                node: node.clone(),
                message,
            });
        }
    }
}

impl std::fmt::Debug for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeType")
            .field("name", &self.name)
            .field("on_node_created", &self.on_node_created.is_some())
            .field("on_executed", &self.on_executed.is_some())
            .finish()
    }
}
