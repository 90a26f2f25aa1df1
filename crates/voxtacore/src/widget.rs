use crate::{compose, Canvas, Handler, HostNode};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Change callback of a text widget, receives the new value
pub type WidgetCallback = Handler<str>;

/// A named text field on a node
pub struct TextWidget {
    name: RwLock<String>,
    value: RwLock<String>,
    serialize: AtomicBool,
    callback: RwLock<Option<WidgetCallback>>,
}

impl TextWidget {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: RwLock::new(name.into()),
            value: RwLock::new(value.into()),
            serialize: AtomicBool::new(true),
            callback: RwLock::new(None),
        }
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    pub fn value(&self) -> String {
        self.value.read().clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        *self.value.write() = value.into();
    }

    /// Whether the value is written into the saved graph
    pub fn serialize(&self) -> bool {
        self.serialize.load(Ordering::SeqCst)
    }

    pub fn set_serialize(&self, serialize: bool) {
        self.serialize.store(serialize, Ordering::SeqCst);
    }

    pub fn callback(&self) -> Option<WidgetCallback> {
        self.callback.read().clone()
    }

    pub fn set_callback(&self, callback: Option<WidgetCallback>) {
        *self.callback.write() = callback;
    }

    /// Install `extension` after whatever callback is already present
    pub fn wrap_callback(&self, extension: WidgetCallback) {
        let mut slot = self.callback.write();
        let previous = slot.take();
        *slot = Some(compose(previous, extension));
    }

    /// Store a new value and fire the change callback, as a user edit does
    pub fn edit(&self, value: impl Into<String>) {
        let value = value.into();
        self.set_value(value.clone());
        if let Some(callback) = self.callback() {
            callback(&value);
        }
    }
}

impl std::fmt::Debug for TextWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextWidget")
            .field("name", &self.name())
            .field("value", &self.value())
            .field("serialize", &self.serialize())
            .finish()
    }
}

/// Widget drawn by extension code inside the host's render pass
pub trait CustomWidget: Send + Sync {
    fn name(&self) -> &str;

    /// Draw into the band starting at `y` and return the vertical space consumed
    fn draw(
        &self,
        canvas: &mut dyn Canvas,
        node: &dyn HostNode,
        width: f64,
        y: f64,
        height: f64,
    ) -> f64;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Entry in a node's widget list
#[derive(Clone)]
pub enum Widget {
    Text(Arc<TextWidget>),
    Custom(Arc<dyn CustomWidget>),
}

impl Widget {
    pub fn name(&self) -> String {
        match self {
            Widget::Text(w) => w.name(),
            Widget::Custom(w) => w.name().to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&Arc<TextWidget>> {
        match self {
            Widget::Text(w) => Some(w),
            Widget::Custom(_) => None,
        }
    }

    pub fn as_custom(&self) -> Option<&Arc<dyn CustomWidget>> {
        match self {
            Widget::Custom(w) => Some(w),
            Widget::Text(_) => None,
        }
    }
}
