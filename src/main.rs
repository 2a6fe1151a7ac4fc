use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use nexus_think::api;
use nexus_think::commands::{CommandHandler, CommandOutcome};
use nexus_think::providers::OllamaProvider;
use nexus_think::{AppConfig, RagContext};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Ask questions about your PDFs with a local model", long_about = None)]
struct Args {
    /// Serve the HTTP API instead of the interactive prompt
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,

    #[arg(long)]
    ollama_url: Option<String>,

    /// Chat model used to answer questions
    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    embedding_model: Option<String>,

    /// Directory uploaded PDFs are written to
    #[arg(long)]
    storage_root: Option<PathBuf>,

    /// Index this PDF before the prompt opens
    #[arg(long)]
    pdf: Option<PathBuf>,
}

impl Args {
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = &self.ollama_url {
            config.ollama_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.chat_model = model.clone();
        }
        if let Some(model) = &self.embedding_model {
            config.embedding_model = model.clone();
        }
        if let Some(root) = &self.storage_root {
            config.storage_root = root.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    colored::control::set_override(true);
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.apply(AppConfig::from_env());
    let ctx = Arc::new(RagContext::from_config(config).context("Failed to initialize pipeline")?);

    if args.api {
        run_api_server(&args, ctx).await
    } else {
        run_cli_mode(&args, ctx).await
    }
}

async fn run_cli_mode(args: &Args, ctx: Arc<RagContext>) -> anyhow::Result<()> {
    println!("\n{}", "🧠 NexusThink".bright_cyan().bold());
    println!(
        "Chat model: {} | Embeddings: {}",
        ctx.config().chat_model.bright_yellow(),
        ctx.config().embedding_model.bright_yellow()
    );
    println!("Type 'help' for commands, 'upload <file>' to index a PDF.\n");

    let mut command_handler = CommandHandler::new(&ctx);

    if let Some(pdf) = &args.pdf {
        let command = format!("upload {}", pdf.display());
        if let Err(e) = command_handler.handle_command(&command).await {
            println!("{}", e.red());
        }
    }

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                match command_handler.handle_command(input).await {
                    Ok(CommandOutcome::Exit) => break,
                    Ok(CommandOutcome::Continue) => {}
                    Err(e) => println!("{}", e.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(args: &Args, ctx: Arc<RagContext>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let config = ctx.config();
    let probe = OllamaProvider::new(&config.ollama_url, &config.chat_model, config.request_timeout)?;

    let app = api::create_api(Arc::clone(&ctx), Some(probe));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    log::info!("API server listening on {}", addr);
    println!("Starting API server on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
