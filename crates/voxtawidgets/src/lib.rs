//! Voxta node extensions
//!
//! The execution summary for the filter node, the thumbnail preview for the
//! output-folder node, and the HTTP client behind the preview.

mod fetcher;
mod filter_existing;
mod output_folder;
pub mod summary;
pub mod thumbnail;

pub use fetcher::{ImageDecoder, ThumbnailFetcher, ThumbnailQueryResult, ThumbnailSource};
pub use filter_existing::{FilterExistingExtension, FILTER_EXTENSION_NAME};
pub use output_folder::{OutputFolderExtension, OUTPUT_FOLDER_EXTENSION_NAME};
pub use summary::{SummaryController, SummaryOutcome};
pub use thumbnail::{ThumbnailController, ThumbnailSettings, ThumbnailStatus, ThumbnailWidget};

use std::sync::Arc;
use voxtaruntime::{ExtensionConfig, ExtensionRegistry};

/// Register both Voxta extensions, the preview using the HTTP fetcher
pub fn register_all(
    registry: &mut ExtensionRegistry,
    config: &ExtensionConfig,
    decoder: Arc<dyn ImageDecoder>,
) {
    registry.register(Arc::new(FilterExistingExtension::new()));
    registry.register(Arc::new(OutputFolderExtension::http(config, decoder)));
}
