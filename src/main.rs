use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_assistant::assistant::{tool_declarations, Assistant, ResolutionMode};
use todo_assistant::client::{TodoClient, TodoService};
use todo_assistant::config::AppConfig;
use todo_assistant::llm::AzureChatClient;
use todo_assistant::{api, db, mcp, shell};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Conversational todo assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the persistence HTTP service
    Serve {
        /// Port for the HTTP service (defaults to MCP_SERVER_PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Interactive assistant shell (default)
    Chat(TurnOptions),
    /// Run a single turn and print the reply
    Ask {
        /// The request, e.g. "删除任务3"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        #[command(flatten)]
        options: TurnOptions,
    },
    /// Show the predicted intent and extracted parameters without running anything
    Analyze {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print the tool declarations offered to the model
    Tools,
    /// Start MCP server via stdio
    Mcp,
}

#[derive(Args, Default)]
struct TurnOptions {
    /// Skip the heuristic cascade and send every turn to the model
    #[arg(long)]
    model_only: bool,

    /// Use the local database directly instead of the HTTP service
    #[arg(long)]
    local: bool,
}

impl TurnOptions {
    fn mode(&self) -> ResolutionMode {
        if self.model_only {
            ResolutionMode::ModelOnly
        } else {
            ResolutionMode::Hybrid
        }
    }
}

/// Initialize tracing with output to stderr (for interactive and MCP modes) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| {
            if use_stderr {
                "todo_assistant=warn".into()
            } else {
                "todo_assistant=debug,tower_http=debug".into()
            }
        }),
    );

    if use_stderr {
        // stdout carries the conversation or the MCP protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_assistant(config: &AppConfig, options: &TurnOptions) -> anyhow::Result<Assistant> {
    let todos: Arc<dyn TodoService> = if options.local {
        let db = db::Database::open_default()?;
        db.migrate()?;
        Arc::new(db)
    } else {
        Arc::new(TodoClient::new(config.todo_url.clone()))
    };

    if config.chat.endpoint.is_none() {
        tracing::warn!("AZURE_OPENAI_ENDPOINT not set; model fallback is unavailable");
    }
    let chat = Arc::new(AzureChatClient::new(config.chat.clone())?);

    Ok(Assistant::new(todos, chat).with_mode(options.mode()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let use_stderr = !matches!(cli.command, Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(config.port);
            tracing::info!("Starting todo service on port {}", port);

            let db = db::Database::open_default()?;
            db.migrate()?;

            let app = api::create_router(db);

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("Todo service listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
        Some(Commands::Ask { text, options }) => {
            let assistant = build_assistant(&config, &options)?;
            let reply = assistant.respond(&text.join(" ")).await;
            println!("{}", reply);
        }
        Some(Commands::Analyze { text }) => {
            let assistant = build_assistant(&config, &TurnOptions::default())?;
            println!("{}", assistant.analyze(&text.join(" ")).render());
        }
        Some(Commands::Tools) => {
            let tools: Vec<_> = tool_declarations().iter().map(|t| t.to_wire()).collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
        Some(Commands::Mcp) => {
            let db = db::Database::open_default()?;
            db.migrate()?;

            mcp::run_stdio_server(db).await?;
        }
        Some(Commands::Chat(options)) => run_chat(&config, &options).await?,
        None => run_chat(&config, &TurnOptions::default()).await?,
    }

    Ok(())
}

async fn run_chat(config: &AppConfig, options: &TurnOptions) -> anyhow::Result<()> {
    let assistant = build_assistant(config, options)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::warn!("Ctrl-C handler unavailable: {}", e);
                // Dropping the sender would end the shell.
                std::future::pending::<()>().await;
            }
        }
    });

    shell::run(
        &assistant,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown_rx,
    )
    .await?;
    Ok(())
}
