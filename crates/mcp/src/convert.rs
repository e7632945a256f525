//! Translation from MCP wire content to the local content-block union.
//!
//! Remote results carry an ordered list of typed items; text becomes `Text`,
//! binary images become `Image` with a `data:` URL, embedded text resources
//! flatten to `Text`. Anything else (audio, blob resources) has no local
//! counterpart and is dropped.

use pincer_core::ContentBlock;
use rmcp::model::{CallToolResult, RawContent, ResourceContents};

/// Translate a remote call result into local content blocks, preserving
/// item order.
pub(crate) fn blocks_from_call_result(result: CallToolResult) -> Vec<ContentBlock> {
    result
        .content
        .into_iter()
        .flatten()
        .filter_map(|item| block_from_content(item.raw))
        .collect()
}

fn block_from_content(raw: RawContent) -> Option<ContentBlock> {
    match raw {
        RawContent::Text(text) => Some(ContentBlock::Text { text: text.text }),
        RawContent::Image(image) => Some(ContentBlock::Image {
            url: format!("data:{};base64,{}", image.mime_type, image.data),
        }),
        RawContent::Resource(embedded) => match embedded.resource {
            ResourceContents::TextResourceContents { text, .. } => {
                Some(ContentBlock::Text { text })
            }
            ResourceContents::BlobResourceContents { .. } => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;

    #[test]
    fn text_content_becomes_text_block() {
        let result = CallToolResult::success(vec![Content::text("four")]);
        let blocks = blocks_from_call_result(result);
        assert_eq!(blocks, vec![ContentBlock::text("four")]);
    }

    #[test]
    fn image_content_becomes_data_url() {
        let result = CallToolResult::success(vec![Content::image("aGk=", "image/png")]);
        let blocks = blocks_from_call_result(result);
        assert_eq!(
            blocks,
            vec![ContentBlock::Image {
                url: "data:image/png;base64,aGk=".to_string()
            }]
        );
    }

    #[test]
    fn embedded_text_resource_flattens_to_text() {
        let resource: ResourceContents = serde_json::from_value(serde_json::json!({
            "uri": "file:///notes.txt",
            "mimeType": "text/plain",
            "text": "remember the milk",
        }))
        .unwrap();
        let result = CallToolResult::success(vec![Content::resource(resource)]);
        let blocks = blocks_from_call_result(result);
        assert_eq!(blocks, vec![ContentBlock::text("remember the milk")]);
    }

    #[test]
    fn order_is_preserved_across_mixed_content() {
        let result = CallToolResult::success(vec![
            Content::text("first"),
            Content::image("Yg==", "image/jpeg"),
            Content::text("last"),
        ]);
        let blocks = blocks_from_call_result(result);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], ContentBlock::text("first"));
        assert!(matches!(blocks[1], ContentBlock::Image { .. }));
        assert_eq!(blocks[2], ContentBlock::text("last"));
    }
}
