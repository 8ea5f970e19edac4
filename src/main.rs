use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use okr_core::generation::{GenerationOrchestrator, GenerationRequest};
use okr_core::{hierarchy, HierarchyStore, TextGenerator};
use okr_tracker::config::{AiArgs, StorageArgs};
use okr_tracker::llm::HttpTextGenerator;
use okr_tracker::{api, mcp};

#[derive(Parser)]
#[command(name = "okrt")]
#[command(about = "Objectives, key results and initiatives with derived progress")]
struct Cli {
    #[command(flatten)]
    storage: StorageArgs,

    #[command(flatten)]
    ai: AiArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "8001")]
        port: u16,

        /// Interface to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Start MCP server via stdio
    Mcp,
    /// Draft OKRs from a business description and print them as JSON
    Generate {
        /// Free-form business context
        #[arg(short, long)]
        context: String,

        #[arg(long, default_value = "")]
        company_size: String,

        #[arg(long, default_value = "")]
        industry: String,

        #[arg(long, default_value = "")]
        time_period: String,

        /// Save the generated objectives and key results
        #[arg(long)]
        persist: bool,
    },
    /// Print the dashboard as JSON
    Dashboard,
}

fn app_state(cli: &Cli) -> anyhow::Result<api::AppState> {
    let db = cli.storage.open()?;
    let generator = HttpTextGenerator::new(cli.ai.generator_config())?;
    if !generator.has_credentials() {
        tracing::warn!("No AI API key configured; OKR generation will fail until one is set");
    }
    let store: Arc<dyn HierarchyStore> = Arc::new(db);
    let generator: Arc<dyn TextGenerator> = Arc::new(generator);
    Ok(api::AppState::new(store, generator))
}

async fn serve(state: api::AppState, host: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting OKR tracker on port {}", port);

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("OKR tracker listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stderr keeps stdout free for MCP and JSON output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "okr_tracker=debug,okr_core=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let state = app_state(&cli)?;

    match cli.command {
        Some(Commands::Serve { port, host }) => serve(state, &host, port).await?,
        Some(Commands::Mcp) => mcp::run_stdio_server(state).await?,
        Some(Commands::Generate {
            context,
            company_size,
            industry,
            time_period,
            persist,
        }) => {
            let request = GenerationRequest {
                context,
                company_size,
                industry,
                time_period,
            };
            let orchestrator = GenerationOrchestrator::new(state.generator.clone());
            let json = if persist {
                let persisted = orchestrator
                    .generate_and_persist(state.store.as_ref(), &request)
                    .await?;
                serde_json::to_string_pretty(&persisted)?
            } else {
                serde_json::to_string_pretty(&orchestrator.generate(&request).await?)?
            };
            println!("{}", json);
        }
        Some(Commands::Dashboard) => {
            let dashboard = hierarchy::dashboard(state.store.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        None => serve(state, "127.0.0.1", 8001).await?,
    }

    Ok(())
}
