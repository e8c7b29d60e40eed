use std::process::ExitCode;
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use codechat_core::config::API_KEY_ENV;
use codechat_core::{BridgeChannels, ChatRequest, Config, GroqClient, MessageBridge};
use tracing::info;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "codechat", version)]
#[command(about = "Ask a Groq-hosted model about code from your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Model to use instead of the configured one
    #[arg(short, long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat panel (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load()?;
    let log_path = logging::init(&config.log_level)?;
    info!(log = %log_path.display(), "codechat starting");

    let api_key = config.resolve_api_key().ok_or_else(|| {
        let location = Config::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "the config file".to_string());
        anyhow!(
            "Groq API key not configured. Set {} or add \"api_key\" to {}",
            API_KEY_ENV,
            location
        )
    })?;

    let mut client = GroqClient::from_config(&config, &api_key);
    if let Some(model) = cli.model.as_deref() {
        client = client.with_model(model);
    }

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(client).await,
        Commands::Ask { question } => ask_once(client, &question).await,
    }
}

/// Opens the chat panel. Closing it disposes the bridge; asks still in flight are abandoned.
async fn run_chat(client: GroqClient) -> Result<ExitCode> {
    let model = client.model().to_string();
    let BridgeChannels { requests, responses, .. } = MessageBridge::open(client);
    let mut app = App::new(&model, requests);
    let mut events = EventHandler::new(responses);

    let mut terminal = tui::init()?;
    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;

    info!("chat panel closed");
    result.map(|()| ExitCode::SUCCESS)
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;
        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

/// Prints the answer on stdout, or the error text on stderr with a failing exit status.
async fn ask_once(client: GroqClient, question: &str) -> Result<ExitCode> {
    let mut bridge = MessageBridge::open(client);
    bridge
        .requests
        .send(ChatRequest::ask(question, None))
        .map_err(|_| anyhow!("Message bridge closed before the question was sent"))?;

    let response = bridge
        .responses
        .recv()
        .await
        .ok_or_else(|| anyhow!("Message bridge closed without answering"))?;

    if response.text.starts_with("Error: ") {
        eprintln!("{}", response.text);
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", response.text);
    Ok(ExitCode::SUCCESS)
}
