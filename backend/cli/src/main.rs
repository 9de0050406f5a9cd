use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use frontdesk_calendar::AppointmentBook;
use frontdesk_config::Config;
use frontdesk_dialogue::TurnController;
use frontdesk_gateway::{start_server, GatewayState};
use frontdesk_intent::providers::OpenAiProvider;
use frontdesk_intent::IntentResolver;
use frontdesk_sessions::SessionStore;
use frontdesk_speech::{AzureTts, SpeechCache, TtsProvider};

#[derive(Parser)]
#[command(name = "frontdesk")]
#[command(about = "FrontDesk, the AI voice receptionist for Stomatologia Kraków")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the receptionist server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show current service status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    frontdesk_logging::init(config.log_dir.as_deref().map(Path::new), &config.log_level);

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{}/health", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("frontdesk is not running on port {}", config.port);
                }
            }
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        voice = %config.voice,
        model = %config.model,
        "starting FrontDesk"
    );
    // Missing credentials are reported but not fatal: the dialogue layer
    // degrades to its transfer-to-reception fallbacks.
    if !config.validate() {
        warn!("running with missing credentials, collaborator calls will fail");
    }

    let sessions = SessionStore::new();
    let ledger = AppointmentBook::new();
    let speech = SpeechCache::new();

    let tts: Arc<dyn TtsProvider> = Arc::new(AzureTts::new(
        config.azure_speech_key.clone().unwrap_or_default(),
        config.azure_speech_region.as_deref().unwrap_or("westeurope"),
        config.voice.clone(),
    ));

    let resolver = IntentResolver::new(
        Arc::new(OpenAiProvider::new(
            config.openai_api_key.clone().unwrap_or_default(),
        )),
        sessions.clone(),
        config.model.clone(),
    );
    let controller = Arc::new(TurnController::new(
        resolver,
        ledger.clone(),
        config.reception_number.clone(),
    ));

    // Warm the cache for the phrases every call hits.
    {
        let speech = speech.clone();
        let tts = Arc::clone(&tts);
        let greeting = controller.greeting();
        let reprompt = controller.reprompt();
        tokio::spawn(async move {
            speech.prewarm(&[greeting, reprompt], tts.as_ref()).await;
        });
    }

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    let state = GatewayState {
        controller,
        ledger,
        sessions,
        speech,
        tts,
        config: Arc::new(config),
    };
    start_server(addr, state).await
}
