//! `pincer tools` — print the assembled tool catalog.

use pincer_config::RuntimeConfig;
use pincer_mcp::{register_remote_tools, McpClient};
use pincer_tools::AskHumanTool;
use std::sync::Arc;

pub async fn run(config: RuntimeConfig) -> anyhow::Result<()> {
    let toolkit = pincer_tools::builtin_toolkit().await;
    toolkit.register(Arc::new(AskHumanTool::stdin())).await;

    for server in &config.mcp_servers {
        let client = Arc::new(McpClient::from_config(server));
        match register_remote_tools(
            &toolkit,
            client,
            server.allow.as_deref(),
            server.deny.as_deref(),
        )
        .await
        {
            Ok(count) => println!("[{}] {count} remote tool(s) from {}", server.name, server.url),
            Err(e) => eprintln!("[{}] unavailable: {e}", server.name),
        }
    }

    println!();
    for definition in toolkit.definitions().await {
        println!("{}", definition.name);
        println!("    {}", definition.description);

        let required: Vec<&str> = definition.parameters["required"]
            .as_array()
            .map(|names| names.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        if !required.is_empty() {
            println!("    required: {}", required.join(", "));
        }
    }

    Ok(())
}
