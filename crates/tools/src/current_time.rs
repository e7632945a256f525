//! Current time tool.

use async_trait::async_trait;
use chrono::Local;
use pincer_core::error::ToolError;
use pincer_core::tool::{Tool, ToolResponse};

/// Reports the local date and time, formatted `YYYY-MM-DD HH:MM:SS`.
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Get the current local date and time."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResponse, ToolError> {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        Ok(ToolResponse::text(format!("Current time: {now}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[tokio::test]
    async fn output_is_a_parseable_timestamp() {
        let tool = CurrentTimeTool;
        let response = tool.execute(serde_json::json!({})).await.unwrap();

        let text = response.text_content().unwrap();
        let stamp = text.strip_prefix("Current time: ").unwrap();
        assert!(NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[test]
    fn tool_definition_has_no_parameters() {
        let tool = CurrentTimeTool;
        let def = tool.to_definition();
        assert_eq!(def.name, "get_current_time");
        assert_eq!(def.parameters["required"], serde_json::json!([]));
    }
}
