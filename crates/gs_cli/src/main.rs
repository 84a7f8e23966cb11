use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use gs_core::{Config, NewsSource};
use gs_feed::{Direction, FeedNavigator, GatewayClient, Navigation, Renderer, TextRenderer};
use gs_news::{temperature_message, NewsApiClient, NewsGateway, OpenWeatherClient, WeatherGateway};
use gs_storage::{create_storage, BatchHistoryStore, StorageKind};
use serde_json::Value;
use tracing::info;

mod browse;
mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personal news and weather dashboard", long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "file", help = "Where feed history is kept: memory, file or sqlite")]
    storage: String,
    #[arg(long)]
    storage_path: Option<PathBuf>,
    /// News gateway endpoint (e.g. http://127.0.0.1:8888/api/news). When
    /// omitted the gateway runs in-process using NEWSAPI_ACCESS_KEY.
    #[arg(long)]
    gateway_url: Option<String>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway
    Serve {
        #[arg(long)]
        addr: Option<String>,
    },
    /// Navigate the news feed
    News {
        #[command(subcommand)]
        command: Option<NewsCommands>,
    },
    /// Show current temperature for a city
    Weather { city: Option<String> },
}

#[derive(clap::Subcommand, Debug, Clone, Copy)]
enum NewsCommands {
    /// Show the current batch, fetching the first one if needed
    Show,
    /// Move to the next batch, fetching unseen headlines at the end
    Next,
    /// Move to the previous batch
    Prev,
    /// Forget history and seen headlines
    Reset,
    /// Interactive mode (Ctrl+Right / Ctrl+Left, q to quit)
    Browse,
}

fn news_source(cli: &Cli, config: &Config) -> anyhow::Result<Arc<dyn NewsSource>> {
    Ok(match &cli.gateway_url {
        Some(url) => {
            info!("🔌 Using news gateway at {}", url);
            Arc::new(GatewayClient::new(url)?)
        }
        None => Arc::new(NewsGateway::from_config(
            Arc::new(NewsApiClient::from_config(config)?),
            config,
        )),
    })
}

async fn run_news(cli: &Cli, config: &Config, command: NewsCommands) -> anyhow::Result<()> {
    let kind: StorageKind = cli.storage.parse()?;
    let history = BatchHistoryStore::new(create_storage(kind, cli.storage_path.clone()).await?);

    let source = news_source(cli, config)?;
    let renderer: Arc<dyn Renderer> = match command {
        NewsCommands::Browse => Arc::new(TextRenderer::new(std::io::stdout()).raw_mode()),
        _ => Arc::new(TextRenderer::new(std::io::stdout())),
    };
    let navigator = FeedNavigator::new(history, source, renderer);

    let outcome = match command {
        NewsCommands::Browse => return browse::browse(&navigator).await,
        NewsCommands::Show => navigator.load_feed().await,
        NewsCommands::Next => navigator.navigate(Direction::Forward).await,
        NewsCommands::Prev => navigator.navigate(Direction::Backward).await,
        NewsCommands::Reset => {
            navigator.history().reset().await;
            info!("🧹 Feed history cleared");
            return Ok(());
        }
    };
    match outcome {
        Navigation::Unchanged => info!("Nothing new to show"),
        other => info!("📰 {:?}", other),
    }
    Ok(())
}

async fn run_weather(config: &Config, city: Option<&str>) -> anyhow::Result<()> {
    let gateway = WeatherGateway::from_config(Arc::new(OpenWeatherClient::from_config(config)?), config);
    let data = gateway.fetch(city).await?;

    let name = data.get("name").and_then(Value::as_str).unwrap_or("Unknown");
    match data.pointer("/main/temp").and_then(Value::as_f64) {
        Some(temp) => println!("{}: {} °C, {}", name, temp.round(), temperature_message(temp)),
        None => println!("{}: no temperature reported", name),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::from_env();

    match &cli.command {
        Commands::Serve { addr } => {
            let addr = addr.clone().unwrap_or_else(|| config.bind_addr.clone());
            let state = gs_web::AppState::from_config(&config)?;
            gs_web::serve(state, &addr).await?;
        }
        Commands::News { command } => {
            run_news(&cli, &config, command.unwrap_or(NewsCommands::Show)).await?;
        }
        Commands::Weather { city } => run_weather(&config, city.as_deref()).await?,
    }
    Ok(())
}
