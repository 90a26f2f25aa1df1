use crate::fetcher::{ImageDecoder, ThumbnailFetcher, ThumbnailSource};
use crate::thumbnail::{ThumbnailController, ThumbnailSettings};
use async_trait::async_trait;
use std::sync::Arc;
use voxtacore::NodeRef;
use voxtaruntime::{AppContext, Extension, ExtensionConfig, NodeDef, NodeHook, NodeMatcher, NodeType};

pub const OUTPUT_FOLDER_EXTENSION_NAME: &str = "Voxta.OutputFolder";

/// Adds a character thumbnail preview to the output-folder node
pub struct OutputFolderExtension {
    source: Arc<dyn ThumbnailSource>,
}

impl OutputFolderExtension {
    pub fn new(source: Arc<dyn ThumbnailSource>) -> Self {
        Self { source }
    }

    /// Use the HTTP fetcher against `config.base_url`
    pub fn http(config: &ExtensionConfig, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self::new(Arc::new(ThumbnailFetcher::new(config.base_url.clone(), decoder)))
    }

    fn matcher() -> NodeMatcher {
        NodeMatcher::exact(&["VoxtaOutputFolder", "Voxta: Output Folder"])
    }
}

#[async_trait]
impl Extension for OutputFolderExtension {
    fn name(&self) -> &str {
        OUTPUT_FOLDER_EXTENSION_NAME
    }

    async fn before_register_node_def(
        &self,
        node_type: &mut NodeType,
        node_data: &NodeDef,
        app: &AppContext,
    ) {
        let source = self.source.clone();
        let settings = ThumbnailSettings::from(&**app.config());

        NodeHook::new(OUTPUT_FOLDER_EXTENSION_NAME, Self::matcher())
            .on_node_created(Arc::new(move |node: &NodeRef| {
                ThumbnailController::install(node, source.clone(), settings.clone());
            }))
            .apply(node_type, node_data);
    }
}
