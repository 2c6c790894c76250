use std::env;
use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use crossterm::tty::IsTty;
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use insectopedia_chat::cli::chat::ChatContext;
use insectopedia_chat::cli::chat::notification::TerminalNotifier;
use insectopedia_chat::cli::chat::render::Renderer;
use insectopedia_chat::cli::chat::session::ChatSession;
use insectopedia_chat::query_client::{BACKEND_URL_ENV, QueryClient, resolve_backend_url};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Question to ask once, without starting an interactive session
    #[arg(short, long)]
    input: Option<String>,

    /// Base URL of the question-answering backend
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        /// Question to ask once, without starting an interactive session
        #[arg(short, long)]
        input: Option<String>,

        /// Base URL of the question-answering backend
        #[arg(short, long)]
        backend_url: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let (input, backend_url, verbose) = match cli.command {
        Some(Commands::Chat {
            input,
            backend_url,
            verbose,
        }) => (input, backend_url, verbose),
        None => (cli.input, cli.backend_url, cli.verbose),
    };

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let backend_url = resolve_backend_url(backend_url, env::var(BACKEND_URL_ENV).ok());
    let client = match QueryClient::new(&backend_url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to initialize query client: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    info!("Starting InsectoPedia chat against {}", client.endpoint());

    let color = io::stdout().is_tty();
    let session = ChatSession::new(client, TerminalNotifier::new(io::stderr().is_tty()));
    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        input,
        true,
        Renderer::new(color),
        session,
    );
    chat_context.run().await
}
