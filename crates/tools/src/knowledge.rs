//! In-memory knowledge base with keyword retrieval.
//!
//! Retrieval is deliberately simple: documents are scored per query term,
//! with a hit in the document name worth 3 and each occurrence among the
//! content tokens worth 1. Only documents that score are returned, best
//! first; ties keep insertion order. No embeddings, no index.

use async_trait::async_trait;
use pincer_core::error::ToolError;
use pincer_core::tool::{Tool, ToolResponse};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// How many documents a search returns when the caller does not say.
pub const DEFAULT_RETRIEVE_LIMIT: usize = 3;

/// A named document in the knowledge base.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub content: String,
    pub metadata: serde_json::Map<String, Value>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach a metadata entry, builder-style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A collection of documents with keyword scoring.
pub struct KnowledgeBase {
    documents: RwLock<Vec<Document>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    pub async fn add(&self, document: Document) {
        self.documents.write().await.push(document);
    }

    pub async fn add_all(&self, documents: Vec<Document>) {
        self.documents.write().await.extend(documents);
    }

    /// The best-scoring documents for `query`, at most `limit` of them.
    ///
    /// A query with no searchable terms (empty, or punctuation only) returns
    /// the first `limit` documents rather than nothing, so a vague question
    /// still surfaces something to read.
    pub async fn retrieve(&self, query: &str, limit: usize) -> Vec<Document> {
        let documents = self.documents.read().await;
        if documents.is_empty() {
            return Vec::new();
        }

        let terms = tokenize(query);
        if terms.is_empty() {
            return documents.iter().take(limit).cloned().collect();
        }

        let mut scored: Vec<(usize, &Document)> = documents
            .iter()
            .filter_map(|doc| {
                let score = score(doc, &terms);
                (score > 0).then_some((score, doc))
            })
            .collect();

        // sort_by is stable, so equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        debug!(query, hits = scored.len(), "knowledge retrieval");

        scored
            .into_iter()
            .take(limit)
            .map(|(_, doc)| doc.clone())
            .collect()
    }

    /// Names of all documents, in insertion order.
    pub async fn names(&self) -> Vec<String> {
        self.documents
            .read()
            .await
            .iter()
            .map(|doc| doc.name.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased runs of alphanumeric characters.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn score(document: &Document, terms: &[String]) -> usize {
    let name = document.name.to_lowercase();
    let content_tokens = tokenize(&document.content);

    let mut score = 0;
    for term in terms {
        if name.contains(term.as_str()) {
            score += 3;
        }
        score += content_tokens.iter().filter(|token| *token == term).count();
    }
    score
}

/// Searches a [`KnowledgeBase`] on behalf of the agent.
pub struct KnowledgeSearchTool {
    knowledge: Arc<KnowledgeBase>,
}

impl KnowledgeSearchTool {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }
}

#[async_trait]
impl Tool for KnowledgeSearchTool {
    fn name(&self) -> &str {
        "search_knowledge"
    }

    fn description(&self) -> &str {
        "Search the knowledge base for documents relevant to a query. Returns the best matches with their content."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of documents to return",
                    "default": DEFAULT_RETRIEVE_LIMIT
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResponse, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'query' argument".into()))?;
        let limit = arguments["limit"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_RETRIEVE_LIMIT);

        let hits = self.knowledge.retrieve(query, limit).await;
        if hits.is_empty() {
            return Ok(ToolResponse::text(format!(
                "No matching documents for '{query}'."
            )));
        }

        let mut output = format!("Found {} matching document(s):\n", hits.len());
        for (index, doc) in hits.iter().enumerate() {
            output.push_str(&format!("\n{}. {}\n{}\n", index + 1, doc.name, doc.content));
        }
        Ok(ToolResponse::text(output.trim_end().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn sample_base() -> Arc<KnowledgeBase> {
        let kb = Arc::new(KnowledgeBase::new());
        kb.add_all(vec![
            Document::new("Rust Book", "a systems programming language"),
            Document::new("Kitchen Notes", "rust removal from cast iron pans"),
            Document::new("Garden Log", "tomatoes and basil, watered daily"),
        ])
        .await;
        kb
    }

    #[tokio::test]
    async fn name_matches_outrank_content_matches() {
        let kb = sample_base().await;
        let hits = kb.retrieve("rust", 3).await;

        let names: Vec<&str> = hits.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Rust Book", "Kitchen Notes"]);
    }

    #[tokio::test]
    async fn repeated_content_hits_accumulate() {
        let kb = Arc::new(KnowledgeBase::new());
        kb.add_all(vec![
            Document::new("once", "the cat sat"),
            Document::new("thrice", "cat cat cat"),
        ])
        .await;

        let hits = kb.retrieve("cat", 2).await;
        assert_eq!(hits[0].name, "thrice");
        assert_eq!(hits[1].name, "once");
    }

    #[tokio::test]
    async fn unmatched_documents_are_excluded() {
        let kb = sample_base().await;
        let hits = kb.retrieve("quantum entanglement", 3).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn empty_query_returns_the_first_documents() {
        let kb = sample_base().await;

        let hits = kb.retrieve("", 2).await;
        let names: Vec<&str> = hits.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Rust Book", "Kitchen Notes"]);

        // Punctuation-only queries tokenize to nothing and behave the same.
        let hits = kb.retrieve("?!;", 2).await;
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn empty_base_returns_nothing() {
        let kb = KnowledgeBase::new();
        assert!(kb.retrieve("anything", 3).await.is_empty());
        assert!(kb.is_empty().await);
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let kb = sample_base().await;
        let hits = kb.retrieve("a", 1).await;
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let kb = Arc::new(KnowledgeBase::new());
        kb.add_all(vec![
            Document::new("first", "shared term"),
            Document::new("second", "shared term"),
        ])
        .await;

        let hits = kb.retrieve("shared", 2).await;
        assert_eq!(hits[0].name, "first");
        assert_eq!(hits[1].name, "second");
    }

    #[tokio::test]
    async fn names_and_clear() {
        let kb = sample_base().await;
        assert_eq!(kb.len().await, 3);
        assert_eq!(
            kb.names().await,
            vec!["Rust Book", "Kitchen Notes", "Garden Log"]
        );

        kb.clear().await;
        assert!(kb.is_empty().await);
    }

    #[tokio::test]
    async fn metadata_rides_along() {
        let kb = Arc::new(KnowledgeBase::new());
        kb.add(
            Document::new("Tagged", "some content")
                .with_metadata("source", serde_json::json!("unit-test")),
        )
        .await;

        let hits = kb.retrieve("tagged", 1).await;
        assert_eq!(hits[0].metadata["source"], "unit-test");
    }

    #[tokio::test]
    async fn tool_formats_hits() {
        let kb = sample_base().await;
        let tool = KnowledgeSearchTool::new(kb);

        let response = tool
            .execute(serde_json::json!({"query": "rust"}))
            .await
            .unwrap();

        let text = response.text_content().unwrap();
        assert!(text.starts_with("Found 2 matching document(s):"));
        assert!(text.contains("1. Rust Book"));
        assert!(text.contains("2. Kitchen Notes"));
        assert!(text.contains("a systems programming language"));
    }

    #[tokio::test]
    async fn tool_reports_when_nothing_matches() {
        let kb = sample_base().await;
        let tool = KnowledgeSearchTool::new(kb);

        let response = tool
            .execute(serde_json::json!({"query": "quantum"}))
            .await
            .unwrap();

        assert_eq!(
            response.text_content().as_deref(),
            Some("No matching documents for 'quantum'.")
        );
    }

    #[tokio::test]
    async fn tool_respects_the_limit_argument() {
        let kb = sample_base().await;
        let tool = KnowledgeSearchTool::new(kb);

        let response = tool
            .execute(serde_json::json!({"query": "a", "limit": 1}))
            .await
            .unwrap();

        assert!(response.text_content().unwrap().starts_with("Found 1"));
    }

    #[tokio::test]
    async fn tool_missing_query_is_rejected() {
        let kb = Arc::new(KnowledgeBase::new());
        let tool = KnowledgeSearchTool::new(kb);
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
