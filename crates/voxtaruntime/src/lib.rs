//! Extension runtime
//!
//! Node-type descriptors with chainable lifecycle handlers, the name-matching
//! hook that installs extension behaviour on them, and the registry that runs
//! every extension against each node definition before the host registers it.

mod hook;
mod node_type;
mod registry;
mod runtime;

pub use hook::{NodeHook, NodeMatcher};
pub use node_type::{Executed, NodeDef, NodeType, OnExecuted, OnNodeCreated};
pub use registry::{Extension, ExtensionRegistry};
pub use runtime::{AppContext, ExtensionConfig, ExtensionRuntime, UpdateOrdering};
