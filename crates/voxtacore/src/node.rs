use crate::{CustomWidget, TextWidget, Widget};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub type NodeId = Uuid;

/// Shared handle to a host node
pub type NodeRef = Arc<dyn HostNode>;

/// The part of a host graph node that extensions touch.
///
/// Extensions append widgets and query them; they never remove any.
pub trait HostNode: Send + Sync {
    /// Instance identifier, stable for the node's lifetime
    fn id(&self) -> NodeId;

    /// Registered node type name (e.g., "VoxtaOutputFolder")
    fn type_name(&self) -> &str;

    /// Snapshot of the widget list, in display order
    fn widgets(&self) -> Vec<Widget>;

    fn add_text_widget(&self, name: &str, value: &str) -> Arc<TextWidget>;

    fn add_custom_widget(&self, widget: Arc<dyn CustomWidget>);

    /// Current `[width, height]`
    fn size(&self) -> [f64; 2];

    fn set_size(&self, size: [f64; 2]);

    /// Ask the host to repaint
    fn set_dirty_canvas(&self, immediate: bool, full_redraw: bool);

    /// Set a per-node flag; true only on the first call for `key`.
    /// Flags live as long as the node.
    fn mark_once(&self, key: &str) -> bool;

    /// First text widget whose name is any of `names`
    fn find_text_widget(&self, names: &[&str]) -> Option<Arc<TextWidget>> {
        self.widgets()
            .into_iter()
            .filter_map(|w| w.as_text().cloned())
            .find(|w| names.contains(&w.name().as_str()))
    }

    fn find_custom_widget(&self, name: &str) -> Option<Arc<dyn CustomWidget>> {
        self.widgets()
            .into_iter()
            .filter_map(|w| w.as_custom().cloned())
            .find(|w| w.name() == name)
    }

    /// Value of the named text widget, empty when there is no such widget
    fn text_value(&self, name: &str) -> String {
        self.find_text_widget(&[name])
            .map(|w| w.value())
            .unwrap_or_default()
    }
}

/// In-memory node for hosts that keep graph state themselves, and for tests
pub struct GraphNode {
    id: NodeId,
    type_name: String,
    widgets: RwLock<Vec<Widget>>,
    size: RwLock<[f64; 2]>,
    redraws: AtomicUsize,
    marks: Mutex<HashSet<String>>,
}

impl GraphNode {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_name: type_name.into(),
            widgets: RwLock::new(Vec::new()),
            size: RwLock::new([200.0, 80.0]),
            redraws: AtomicUsize::new(0),
            marks: Mutex::new(HashSet::new()),
        }
    }

    /// Add a text input the way the host does for declared node inputs
    pub fn with_input(self, name: &str, value: &str) -> Self {
        self.add_text_widget(name, value);
        self
    }

    pub fn with_size(self, size: [f64; 2]) -> Self {
        *self.size.write() = size;
        self
    }

    /// Number of repaint requests received so far
    pub fn redraw_count(&self) -> usize {
        self.redraws.load(Ordering::SeqCst)
    }
}

impl HostNode for GraphNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn widgets(&self) -> Vec<Widget> {
        self.widgets.read().clone()
    }

    fn add_text_widget(&self, name: &str, value: &str) -> Arc<TextWidget> {
        let widget = Arc::new(TextWidget::new(name, value));
        self.widgets.write().push(Widget::Text(widget.clone()));
        widget
    }

    fn add_custom_widget(&self, widget: Arc<dyn CustomWidget>) {
        self.widgets.write().push(Widget::Custom(widget));
    }

    fn size(&self) -> [f64; 2] {
        *self.size.read()
    }

    fn set_size(&self, size: [f64; 2]) {
        *self.size.write() = size;
    }

    fn set_dirty_canvas(&self, _immediate: bool, _full_redraw: bool) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }

    fn mark_once(&self, key: &str) -> bool {
        self.marks.lock().insert(key.to_string())
    }
}
