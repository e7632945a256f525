//! `pincer chat` — interactive chat or single-message mode.

use pincer_agent::{InterruptibleAgent, ReactAgent};
use pincer_config::RuntimeConfig;
use pincer_core::{Agent, Message};
use pincer_mcp::{register_remote_tools, McpClient};
use pincer_memory::InMemoryStore;
use pincer_reasoners::OpenAiReasoner;
use pincer_tools::AskHumanTool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::user::UserAgent;

pub async fn run(config: RuntimeConfig, message: Option<String>) -> anyhow::Result<()> {
    let Some(api_key) = config.reasoner.api_key.clone() else {
        eprintln!();
        eprintln!("  no API key configured.");
        eprintln!();
        eprintln!("  set one of:");
        eprintln!("    PINCER_API_KEY=sk-...");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!();
        eprintln!(
            "  or add api_key under [reasoner] in {}",
            RuntimeConfig::config_dir().join("config.toml").display()
        );
        anyhow::bail!("no API key found");
    };

    let reasoner = Arc::new(
        OpenAiReasoner::new(
            "openai",
            &config.reasoner.base_url,
            api_key,
            &config.reasoner.model,
        )
        .with_temperature(config.reasoner.temperature),
    );

    let toolkit = Arc::new(pincer_tools::builtin_toolkit().await);
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
            Ok(count) => info!(server = %server.name, tools = count, "registered remote tools"),
            Err(e) => warn!(server = %server.name, error = %e, "skipping unreachable MCP server"),
        }
    }
    let tool_names = toolkit.names().await;

    let engine = ReactAgent::new(
        config.agent.name.clone(),
        config.agent.system_prompt.clone(),
        reasoner,
        toolkit,
        Arc::new(InMemoryStore::new()),
    )
    .with_max_iterations(config.agent.max_iterations);
    let agent = Arc::new(InterruptibleAgent::new(Arc::new(engine)));

    // Every Ctrl+C lands here: interrupt the turn in flight, or explain.
    let interrupter = agent.clone();
    let ctrl_c = tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                break;
            }
            if interrupter.interrupt() {
                eprintln!();
                eprintln!("  (interrupting the current turn)");
            } else {
                eprintln!();
                eprintln!("  (nothing in flight; type 'exit' to quit)");
            }
        }
    });

    let outcome = if let Some(text) = message {
        single_message(&agent, text).await
    } else {
        repl(&agent, &config, &tool_names).await
    };

    ctrl_c.abort();
    outcome
}

async fn single_message(agent: &Arc<InterruptibleAgent>, text: String) -> anyhow::Result<()> {
    let reply = agent.run(Message::user("user", text).into()).await?;
    println!("{}", reply.text_content().unwrap_or_default());
    Ok(())
}

async fn repl(
    agent: &Arc<InterruptibleAgent>,
    config: &RuntimeConfig,
    tool_names: &[String],
) -> anyhow::Result<()> {
    println!();
    println!("  pincer — interactive chat");
    println!();
    println!("  endpoint: {}", config.reasoner.base_url);
    println!("  model:    {}", config.reasoner.model);
    println!("  agent:    {}", config.agent.name);
    println!("  tools:    {}", tool_names.join(", "));
    println!();
    println!("  type a message and press Enter. Ctrl+C interrupts a running");
    println!("  turn; 'exit' quits.");

    let user = UserAgent::new("user");
    let mut last_reply: Option<Message> = None;

    loop {
        // The user agent renders the previous reply, then reads the next line.
        let user_message = user.reply(last_reply.take().into()).await?;
        let text = user_message.text_content().unwrap_or_default();
        let trimmed = text.trim();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }

        match agent.run(user_message.into()).await {
            Ok(reply) => last_reply = Some(reply),
            Err(e) => {
                eprintln!();
                eprintln!("  [error] {e}");
            }
        }
    }

    println!();
    println!("  goodbye.");
    Ok(())
}
