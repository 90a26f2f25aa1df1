// crates/voxtawidgets/tests/extension_test.rs

use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use voxtacore::{
    FetchError, GraphNode, HostNode, ImageSize, ImageState, NodeRef, RecordingCanvas,
};
use voxtaruntime::{ExtensionConfig, ExtensionRegistry, ExtensionRuntime, NodeDef};
use voxtawidgets::thumbnail::THUMBNAIL_WIDGET_NAME;
use voxtawidgets::{register_all, ImageDecoder, ThumbnailStatus, ThumbnailWidget};

/// Reports a fixed size for any non-empty payload
struct FixedSizeDecoder;

impl ImageDecoder for FixedSizeDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ImageSize, FetchError> {
        if bytes.is_empty() {
            return Err(FetchError::Image("empty body".to_string()));
        }
        Ok(ImageSize::new(400.0, 200.0))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn runtime_for(base_url: String) -> ExtensionRuntime {
    let config = ExtensionConfig {
        base_url,
        initial_update_delay_ms: 0,
        ..ExtensionConfig::default()
    };
    let mut registry = ExtensionRegistry::new();
    register_all(&mut registry, &config, Arc::new(FixedSizeDecoder));
    ExtensionRuntime::with_registry(registry, config)
}

fn thumbnail_widget(node: &NodeRef) -> Arc<ThumbnailWidget> {
    node.find_custom_widget(THUMBNAIL_WIDGET_NAME)
        .expect("thumbnail widget installed")
        .into_any()
        .downcast::<ThumbnailWidget>()
        .ok()
        .expect("thumbnail widget type")
}

async fn wait_for(widget: &ThumbnailWidget, status: ThumbnailStatus) {
    for _ in 0..400 {
        if widget.status() == status {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {status}, still {}", widget.status());
}

#[tokio::test]
async fn test_registry_lists_both_extensions() {
    let runtime = runtime_for("http://127.0.0.1:8188".to_string());
    assert_eq!(
        runtime.registry().list_extensions(),
        vec!["Voxta.FilterExistingCombinations", "Voxta.OutputFolder"]
    );

    let prepared = runtime.prepare_all(&NodeDef::voxta_catalog()).await;
    assert!(prepared["VoxtaExportCharacter"].on_node_created.is_none());
    assert!(prepared["VoxtaFilterExistingCombinations"].on_executed.is_some());
    assert!(prepared["VoxtaOutputFolder"].on_node_created.is_some());
    assert!(prepared["VoxtaOutputFolder"].on_executed.is_none());
}

#[tokio::test]
async fn test_filter_node_summary_lifecycle() {
    init_tracing();
    let runtime = runtime_for("http://127.0.0.1:8188".to_string());
    let node_type = runtime
        .prepare_node_type(&NodeDef::new("VoxtaFilterExistingCombinations"))
        .await;

    let node: NodeRef = Arc::new(GraphNode::new("VoxtaFilterExistingCombinations"));
    node_type.node_created(&node);
    assert_eq!(node.text_value("Summary"), "Waiting for execution...");

    node_type.executed(
        &node,
        Some(json!({
            "ui": {"summary": ["Kept 3 of 5 combinations."], "skipped": [2], "kept": [3]}
        })),
    );
    assert_eq!(
        node.text_value("Summary"),
        "Kept 3 of 5 combinations. (Skipped: 2, Kept: 3)"
    );

    node_type.executed(&node, Some(json!({"ui": {"skipped": [0], "kept": [5]}})));
    assert_eq!(node.text_value("Summary"), "(Summary missing in UI payload)");

    node_type.executed(&node, Some(json!({})));
    assert_eq!(node.text_value("Summary"), "(No UI payload yet)");
    assert_eq!(node.widgets().len(), 1);
}

#[tokio::test]
async fn test_execution_before_creation_creates_summary() {
    let runtime = runtime_for("http://127.0.0.1:8188".to_string());
    let node_type = runtime
        .prepare_node_type(&NodeDef::new("Voxta: Filter Existing Combinations"))
        .await;

    let node: NodeRef = Arc::new(GraphNode::new("Voxta: Filter Existing Combinations"));
    let legacy = node.add_text_widget("execution_summary_widget", "stale");

    node_type.executed(
        &node,
        Some(json!({"outputs": [{"ui": {"summary": "Kept all 4 combinations (bypass)", "skipped": 0, "kept": 4}}]})),
    );

    assert_eq!(legacy.name(), "Summary");
    assert_eq!(
        legacy.value(),
        "Kept all 4 combinations (bypass) (Skipped: 0, Kept: 4)"
    );
    assert_eq!(node.widgets().len(), 1);
}

#[tokio::test]
async fn test_output_folder_preview_end_to_end() {
    init_tracing();
    let mut server = Server::new_async().await;
    let check = server
        .mock("POST", "/voxta/check_thumbnail")
        .match_body(Matcher::Json(json!({"path": "C:\\Chars\\Alice"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"found": true, "thumbnail_path": "Alice/thumbnail.png"}"#)
        .create_async()
        .await;
    let image = server
        .mock("GET", "/voxta/thumbnail")
        .match_query(Matcher::UrlEncoded(
            "path".into(),
            "Alice/thumbnail.png".into(),
        ))
        .with_status(200)
        .with_body(b"\x89PNG-not-really")
        .create_async()
        .await;

    let runtime = runtime_for(server.url());
    let node_type = runtime
        .prepare_node_type(&NodeDef::new("VoxtaOutputFolder"))
        .await;

    let graph_node = Arc::new(
        GraphNode::new("VoxtaOutputFolder")
            .with_input("output_path", "C:\\Chars\\Alice\\Assets")
            .with_input("subfolder", "Avatars/Default"),
    );
    let node: NodeRef = graph_node.clone();
    node_type.node_created(&node);

    let widget = thumbnail_widget(&node);
    wait_for(&widget, ThumbnailStatus::ImageFound).await;

    let loaded = widget.image().expect("image set");
    for _ in 0..400 {
        if loaded.state() != ImageState::Loading {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(loaded.state(), ImageState::Loaded(ImageSize::new(400.0, 200.0)));

    let mut canvas = RecordingCanvas::new();
    let consumed = node.widgets()[2]
        .as_custom()
        .expect("custom widget last")
        .draw(&mut canvas, node.as_ref(), 220.0, 50.0, 20.0);
    assert_eq!(consumed, 160.0);
    assert_eq!(canvas.images().len(), 1);
    assert!(graph_node.size()[1] >= 210.0);

    check.assert_async().await;
    image.assert_async().await;
}

#[tokio::test]
async fn test_output_folder_not_a_character_after_edit() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/voxta/check_thumbnail")
        .with_status(200)
        .with_body(r#"{"found": false}"#)
        .expect_at_least(1)
        .create_async()
        .await;

    let runtime = runtime_for(server.url());
    let node_type = runtime
        .prepare_node_type(&NodeDef::new("Voxta: Output Folder"))
        .await;

    let node: NodeRef = Arc::new(
        GraphNode::new("Voxta: Output Folder")
            .with_input("output_path", "")
            .with_input("subfolder", ""),
    );
    node_type.node_created(&node);

    let widget = thumbnail_widget(&node);
    wait_for(&widget, ThumbnailStatus::EnterPath).await;

    node.find_text_widget(&["output_path"])
        .expect("output_path input")
        .edit("D:/Downloads/random");
    wait_for(&widget, ThumbnailStatus::NotACharacter).await;
    assert!(widget.image().is_none());
}

#[tokio::test]
async fn test_missing_character_on_error_status_is_not_a_character() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/voxta/check_thumbnail")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"found": false}"#)
        .expect_at_least(1)
        .create_async()
        .await;

    let runtime = runtime_for(server.url());
    let node_type = runtime
        .prepare_node_type(&NodeDef::new("Voxta: Output Folder"))
        .await;

    let node: NodeRef = Arc::new(
        GraphNode::new("Voxta: Output Folder")
            .with_input("output_path", "D:/Downloads/random")
            .with_input("subfolder", ""),
    );
    node_type.node_created(&node);

    let widget = thumbnail_widget(&node);
    wait_for(&widget, ThumbnailStatus::NotACharacter).await;
    assert!(widget.image().is_none());
}

#[tokio::test]
async fn test_unreachable_backend_shows_error() {
    // Port 9 (discard) on localhost is expected to refuse connections
    let runtime = runtime_for("http://127.0.0.1:9".to_string());
    let node_type = runtime
        .prepare_node_type(&NodeDef::new("VoxtaOutputFolder"))
        .await;

    let node: NodeRef = Arc::new(
        GraphNode::new("VoxtaOutputFolder").with_input("output_path", "C:/Chars/Alice"),
    );
    node_type.node_created(&node);

    wait_for(&thumbnail_widget(&node), ThumbnailStatus::Error).await;
}
