//! In-process MCP servers for integration tests.
//!
//! Both transports serve the same small tool set. The invocation counter is
//! shared by every service instance a server hands out, so tests can observe
//! how many times the remote side actually executed across sessions.

use std::sync::Arc;

use rmcp::handler::server::{router::tool::ToolRouter, tool::Parameters};
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{
    ErrorData, ServerHandler,
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct TestToolService {
    call_count: Arc<Mutex<u32>>,
    tool_router: ToolRouter<TestToolService>,
}

impl TestToolService {
    pub fn with_counter(call_count: Arc<Mutex<u32>>) -> Self {
        Self {
            call_count,
            tool_router: Self::tool_router(),
        }
    }

    async fn record_call(&self) {
        let mut count = self.call_count.lock().await;
        *count += 1;
    }
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct EchoRequest {
    #[schemars(description = "Message to echo back")]
    pub message: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddRequest {
    #[schemars(description = "First number to add")]
    pub a: f64,
    #[schemars(description = "Second number to add")]
    pub b: f64,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct BrokenRequest {
    #[schemars(description = "Failure text to report")]
    pub reason: String,
}

#[tool_router]
impl TestToolService {
    #[tool(description = "Echo back the input message")]
    async fn echo(
        &self,
        Parameters(EchoRequest { message }): Parameters<EchoRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.record_call().await;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            message,
        )]))
    }

    #[tool(description = "Add two numbers together")]
    async fn add(
        &self,
        Parameters(AddRequest { a, b }): Parameters<AddRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.record_call().await;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            format!("{}", a + b),
        )]))
    }

    #[tool(description = "Fail with the given reason after executing")]
    async fn broken(
        &self,
        Parameters(BrokenRequest { reason }): Parameters<BrokenRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.record_call().await;
        Err(ErrorData::internal_error(reason, None))
    }

    #[tool(description = "Get the number of times tools have been called")]
    async fn get_call_count(&self) -> Result<CallToolResult, ErrorData> {
        let count = self.call_count.lock().await;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            format!("{}", *count),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for TestToolService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: None,
            ..Default::default()
        }
    }
}

/// Start a streamable HTTP server on an ephemeral port. Aborting the
/// returned handle drops the listener, so later sessions are refused.
pub async fn start_http_server(
    call_count: Arc<Mutex<u32>>,
) -> (String, tokio::task::JoinHandle<()>) {
    let service = StreamableHttpService::new(
        move || Ok(TestToolService::with_counter(call_count.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Give the server a moment to start
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    (format!("http://{addr}/mcp"), handle)
}

/// Start an SSE server on an ephemeral port. Cancelling the returned token
/// shuts it down.
pub async fn start_sse_server(call_count: Arc<Mutex<u32>>) -> (String, CancellationToken) {
    let config = SseServerConfig {
        bind: "127.0.0.1:0".parse().unwrap(),
        sse_path: "/sse".to_string(),
        post_path: "/message".to_string(),
        ct: CancellationToken::new(),
        sse_keep_alive: None,
    };

    let (sse_server, router) = SseServer::new(config);
    let listener = tokio::net::TcpListener::bind(sse_server.config.bind)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let ct = sse_server.config.ct.child_token();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        ct.cancelled().await;
    });
    tokio::spawn(async move {
        if let Err(e) = server.await {
            tracing::error!(error = %e, "sse server shutdown with error");
        }
    });

    let service_ct =
        sse_server.with_service(move || TestToolService::with_counter(call_count.clone()));

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    (format!("http://{addr}/sse"), service_ct)
}
