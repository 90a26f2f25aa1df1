//! Character thumbnail preview for the output-folder node.

use crate::fetcher::{ThumbnailQueryResult, ThumbnailSource};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use voxtacore::path::normalize;
use voxtacore::{
    Canvas, CustomWidget, FetchError, HostNode, ImageRef, ImageState, NodeRef, Rect, TextAlign,
    TextStyle,
};
use voxtaruntime::{ExtensionConfig, UpdateOrdering};

pub const THUMBNAIL_WIDGET_NAME: &str = "voxta_thumbnail_widget";
pub const OUTPUT_PATH_FIELD: &str = "output_path";
pub const SUBFOLDER_FIELD: &str = "subfolder";

/// Height of the display band
pub const THUMBNAIL_HEIGHT: f64 = 150.0;
/// Horizontal inset on each side, also added below the band
pub const THUMBNAIL_MARGIN: f64 = 10.0;

const PLACEHOLDER_FILL: &str = "#333";
const STATUS_COLOR: &str = "#888";
const STATUS_FONT: &str = "14px Arial";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStatus {
    Initializing,
    EnterPath,
    Loading,
    ImageFound,
    NotACharacter,
    Error,
}

impl ThumbnailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailStatus::Initializing => "Initializing...",
            ThumbnailStatus::EnterPath => "Enter path",
            ThumbnailStatus::Loading => "Loading...",
            ThumbnailStatus::ImageFound => "Image Found",
            ThumbnailStatus::NotACharacter => "Not a Voxta character",
            ThumbnailStatus::Error => "Error",
        }
    }
}

impl fmt::Display for ThumbnailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the render pass needs
#[derive(Debug, Clone)]
pub struct ThumbnailState {
    pub status: ThumbnailStatus,
    pub image: Option<ImageRef>,
}

impl Default for ThumbnailState {
    fn default() -> Self {
        Self {
            status: ThumbnailStatus::Initializing,
            image: None,
        }
    }
}

/// Result of one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOutput {
    /// Vertical space taken, always band height plus margin
    pub consumed: f64,
    /// Smallest node height that fits the band
    pub min_node_height: f64,
}

/// Draw the thumbnail band for `state` starting at `y`.
///
/// A loaded image is scaled to the band width, then shrunk to the band height
/// if needed, keeping its aspect ratio, and centred. Anything else draws the
/// placeholder with the status text.
pub fn render_thumbnail(
    state: &ThumbnailState,
    canvas: &mut dyn Canvas,
    width: f64,
    y: f64,
) -> RenderOutput {
    let inner_width = (width - THUMBNAIL_MARGIN * 2.0).max(0.0);
    let loaded = state
        .image
        .as_ref()
        .and_then(|image| image.size().map(|size| (image, size)))
        .filter(|(_, size)| size.width > 0.0 && size.height > 0.0);

    match loaded {
        Some((image, size)) => {
            let ratio = size.width / size.height;
            let mut w = inner_width;
            let mut h = w / ratio;
            if h > THUMBNAIL_HEIGHT {
                h = THUMBNAIL_HEIGHT;
                w = h * ratio;
            }
            let x = THUMBNAIL_MARGIN + (inner_width - w) / 2.0;
            canvas.draw_image(image, Rect::new(x, y + (THUMBNAIL_HEIGHT - h) / 2.0, w, h));
        }
        None => {
            canvas.fill_rect(
                Rect::new(THUMBNAIL_MARGIN, y, inner_width, THUMBNAIL_HEIGHT),
                PLACEHOLDER_FILL,
            );
            let style = TextStyle {
                color: STATUS_COLOR.to_string(),
                font: STATUS_FONT.to_string(),
                align: TextAlign::Center,
            };
            canvas.fill_text(
                state.status.as_str(),
                width / 2.0,
                y + THUMBNAIL_HEIGHT / 2.0,
                &style,
            );
        }
    }

    RenderOutput {
        consumed: THUMBNAIL_HEIGHT + THUMBNAIL_MARGIN,
        min_node_height: y + THUMBNAIL_HEIGHT + THUMBNAIL_MARGIN,
    }
}

/// Custom widget showing the thumbnail or the current status
pub struct ThumbnailWidget {
    state: RwLock<ThumbnailState>,
    controller: Mutex<Weak<ThumbnailController>>,
}

impl ThumbnailWidget {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ThumbnailState::default()),
            controller: Mutex::new(Weak::new()),
        }
    }

    pub fn status(&self) -> ThumbnailStatus {
        self.state.read().status
    }

    pub fn image(&self) -> Option<ImageRef> {
        self.state.read().image.clone()
    }

    pub fn snapshot(&self) -> ThumbnailState {
        self.state.read().clone()
    }

    fn set_status(&self, status: ThumbnailStatus) {
        self.state.write().status = status;
    }

    fn set(&self, status: ThumbnailStatus, image: Option<ImageRef>) {
        let mut state = self.state.write();
        state.status = status;
        state.image = image;
    }

    /// Drop `image` if it is still the one shown; returns whether it was
    fn discard_image(&self, image: &ImageRef) -> bool {
        let mut state = self.state.write();
        match &state.image {
            Some(current) if current.same_as(image) => {
                state.image = None;
                state.status = ThumbnailStatus::Error;
                true
            }
            _ => false,
        }
    }
}

impl Default for ThumbnailWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomWidget for ThumbnailWidget {
    fn name(&self) -> &str {
        THUMBNAIL_WIDGET_NAME
    }

    fn draw(
        &self,
        canvas: &mut dyn Canvas,
        node: &dyn HostNode,
        width: f64,
        y: f64,
        _height: f64,
    ) -> f64 {
        let output = render_thumbnail(&self.snapshot(), canvas, width, y);
        let [node_width, node_height] = node.size();
        if output.min_node_height > node_height {
            node.set_size([node_width, output.min_node_height]);
        }
        output.consumed
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Settings the controller takes from the extension configuration
#[derive(Debug, Clone)]
pub struct ThumbnailSettings {
    pub known_leaf_names: Vec<String>,
    pub ordering: UpdateOrdering,
    pub initial_delay: Duration,
}

impl From<&ExtensionConfig> for ThumbnailSettings {
    fn from(config: &ExtensionConfig) -> Self {
        Self {
            known_leaf_names: config.known_leaf_names.clone(),
            ordering: config.update_ordering,
            initial_delay: Duration::from_millis(config.initial_update_delay_ms),
        }
    }
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self::from(&ExtensionConfig::default())
    }
}

/// Drives a node's thumbnail widget from its path fields.
///
/// Each update is independent. With `UpdateOrdering::LastResolvedWins` the
/// query that resolves last decides what is shown, even if it was issued
/// first; `LatestIssuedWins` drops results of superseded updates.
pub struct ThumbnailController {
    node: Weak<dyn HostNode>,
    widget: Arc<ThumbnailWidget>,
    source: Arc<dyn ThumbnailSource>,
    settings: ThumbnailSettings,
    generation: AtomicU64,
}

impl ThumbnailController {
    /// Attach the thumbnail widget to `node`, hook its path fields and
    /// schedule the first update.
    ///
    /// A node that already carries a bound thumbnail widget keeps its
    /// controller; fields are hooked once per widget.
    pub fn install(
        node: &NodeRef,
        source: Arc<dyn ThumbnailSource>,
        settings: ThumbnailSettings,
    ) -> Arc<Self> {
        let widget = node
            .find_custom_widget(THUMBNAIL_WIDGET_NAME)
            .and_then(|existing| existing.into_any().downcast::<ThumbnailWidget>().ok())
            .unwrap_or_else(|| {
                let widget = Arc::new(ThumbnailWidget::new());
                node.add_custom_widget(widget.clone());
                widget
            });

        let mut bound = widget.controller.lock();
        if let Some(existing) = bound.upgrade() {
            debug!(node_id = %node.id(), "Thumbnail widget already bound");
            return existing;
        }

        let controller = Arc::new(Self {
            node: Arc::downgrade(node),
            widget: widget.clone(),
            source,
            settings,
            generation: AtomicU64::new(0),
        });
        *bound = Arc::downgrade(&controller);
        drop(bound);

        for field in [OUTPUT_PATH_FIELD, SUBFOLDER_FIELD] {
            if let Some(input) = node.find_text_widget(&[field]) {
                let controller = controller.clone();
                input.wrap_callback(Arc::new(move |_: &str| {
                    controller.update();
                }));
            }
        }

        controller.schedule_initial_update();
        controller
    }

    pub fn widget(&self) -> &Arc<ThumbnailWidget> {
        &self.widget
    }

    /// Re-read the path fields and refresh the widget.
    ///
    /// Returns the handle of the spawned query, if one was issued.
    pub fn update(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let node = self.node.upgrade()?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let output_path = node.text_value(OUTPUT_PATH_FIELD);
        let subfolder = node.text_value(SUBFOLDER_FIELD);

        if output_path.trim().is_empty() {
            self.widget.set(ThumbnailStatus::EnterPath, None);
            node.set_dirty_canvas(true, true);
            return None;
        }

        self.widget.set_status(ThumbnailStatus::Loading);
        node.set_dirty_canvas(true, true);

        let base_path = normalize(&output_path, &self.settings.known_leaf_names);
        debug!(node_id = %node.id(), %base_path, %subfolder, generation, "Checking thumbnail");

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                self.apply(
                    generation,
                    &base_path,
                    Err(FetchError::Transport(format!("no async runtime: {}", e))),
                );
                return None;
            }
        };

        let this = self.clone();
        Some(runtime.spawn(async move {
            let result = this.source.query(&base_path).await;
            this.apply(generation, &base_path, result);
        }))
    }

    fn schedule_initial_update(self: &Arc<Self>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, skipping initial thumbnail update");
            return;
        };
        let this = self.clone();
        let delay = self.settings.initial_delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            this.update();
        });
    }

    fn apply(
        &self,
        generation: u64,
        base_path: &str,
        result: Result<ThumbnailQueryResult, FetchError>,
    ) {
        if self.settings.ordering == UpdateOrdering::LatestIssuedWins
            && self.generation.load(Ordering::SeqCst) != generation
        {
            debug!(%base_path, generation, "Discarding superseded thumbnail result");
            return;
        }
        let Some(node) = self.node.upgrade() else {
            return;
        };

        match result {
            Ok(ThumbnailQueryResult {
                found: true,
                thumbnail_path: Some(path),
            }) if !path.is_empty() => {
                let image = self.source.load_image(&path);
                self.widget.set(ThumbnailStatus::ImageFound, Some(image.clone()));

                let widget = self.widget.clone();
                let node = Arc::downgrade(&node);
                let loaded = image.clone();
                image.on_settled(move |state| {
                    if let ImageState::Failed(reason) = state {
                        warn!(src = %loaded.src(), %reason, "Thumbnail image failed to load");
                        widget.discard_image(&loaded);
                    }
                    if let Some(node) = node.upgrade() {
                        node.set_dirty_canvas(true, true);
                    }
                });
            }
            Ok(_) => {
                self.widget.set(ThumbnailStatus::NotACharacter, None);
                node.set_dirty_canvas(true, true);
            }
            Err(e) => {
                error!(%base_path, error = %e, "Error checking thumbnail");
                self.widget.set(ThumbnailStatus::Error, None);
                node.set_dirty_canvas(true, true);
            }
        }
    }
}
