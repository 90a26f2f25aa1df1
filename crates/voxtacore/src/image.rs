use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Intrinsic pixel size of a decoded image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Load state of an image reference
#[derive(Debug, Clone, PartialEq)]
pub enum ImageState {
    Loading,
    Loaded(ImageSize),
    Failed(String),
}

type SettleListener = Box<dyn FnOnce(&ImageState) + Send>;

struct ImageSlot {
    state: ImageState,
    listeners: Vec<SettleListener>,
}

/// Handle to an image that loads asynchronously.
///
/// Mirrors the host's image primitive: the source is fixed at construction,
/// completion is signalled through `on_settled` listeners rather than a return
/// value. Clones share the same underlying image.
#[derive(Clone)]
pub struct ImageRef {
    src: Arc<str>,
    slot: Arc<Mutex<ImageSlot>>,
}

impl ImageRef {
    pub fn new(src: impl Into<String>) -> Self {
        let src: String = src.into();
        Self {
            src: Arc::from(src),
            slot: Arc::new(Mutex::new(ImageSlot {
                state: ImageState::Loading,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn state(&self) -> ImageState {
        self.slot.lock().state.clone()
    }

    /// True once the image has decoded successfully
    pub fn is_complete(&self) -> bool {
        matches!(self.slot.lock().state, ImageState::Loaded(_))
    }

    pub fn size(&self) -> Option<ImageSize> {
        match self.slot.lock().state {
            ImageState::Loaded(size) => Some(size),
            _ => None,
        }
    }

    /// Register a listener for load completion or failure.
    ///
    /// Runs immediately when the image has already settled.
    pub fn on_settled(&self, listener: impl FnOnce(&ImageState) + Send + 'static) {
        let mut slot = self.slot.lock();
        if slot.state == ImageState::Loading {
            slot.listeners.push(Box::new(listener));
            return;
        }
        let state = slot.state.clone();
        drop(slot);
        listener(&state);
    }

    /// Mark the image as decoded
    pub fn resolve(&self, size: ImageSize) {
        self.settle(ImageState::Loaded(size));
    }

    /// Mark the image as failed
    pub fn fail(&self, reason: impl Into<String>) {
        self.settle(ImageState::Failed(reason.into()));
    }

    /// Identity comparison; two loads of the same source are different images
    pub fn same_as(&self, other: &ImageRef) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    fn settle(&self, state: ImageState) {
        let listeners = {
            let mut slot = self.slot.lock();
            if slot.state != ImageState::Loading {
                return;
            }
            slot.state = state.clone();
            std::mem::take(&mut slot.listeners)
        };
        for listener in listeners {
            listener(&state);
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("src", &self.src)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_fires_on_resolve() {
        let image = ImageRef::new("/voxta/thumbnail?path=a.png");
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        image.on_settled(move |state| *sink.lock() = Some(state.clone()));

        assert!(!image.is_complete());
        image.resolve(ImageSize::new(64.0, 32.0));

        assert!(image.is_complete());
        assert_eq!(
            *seen.lock(),
            Some(ImageState::Loaded(ImageSize::new(64.0, 32.0)))
        );
    }

    #[test]
    fn test_late_listener_runs_immediately() {
        let image = ImageRef::new("x");
        image.fail("404");

        let seen = Arc::new(Mutex::new(false));
        let sink = seen.clone();
        image.on_settled(move |state| {
            *sink.lock() = matches!(state, ImageState::Failed(_));
        });

        assert!(*seen.lock());
    }

    #[test]
    fn test_settles_only_once() {
        let image = ImageRef::new("x");
        image.resolve(ImageSize::new(1.0, 1.0));
        image.fail("too late");

        assert_eq!(image.size(), Some(ImageSize::new(1.0, 1.0)));
    }

    #[test]
    fn test_identity() {
        let a = ImageRef::new("same");
        let b = ImageRef::new("same");
        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
    }
}
