mod logging;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use harvest_logging::{harvest_error, harvest_info};
use postharvest_core::HarvestLimits;
use postharvest_engine::{
    harvest_posts, load_cookie_file, write_posts_json, HarvestSettings, WebDriverConfig,
    WebDriverSession,
};

type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "postharvest")]
#[command(about = "Harvest posts from an infinitely scrolling profile feed")]
#[command(version)]
struct Cli {
    /// WebDriver endpoint driving the headless browser
    #[arg(long, global = true, default_value = "http://localhost:9515")]
    webdriver_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest once and write the posts to a JSON file
    Scrape {
        /// Profile URL whose feed should be harvested
        #[arg(long)]
        profile_url: String,
        /// Number of unique posts to collect
        #[arg(long, default_value_t = 5)]
        num_posts: usize,
        /// Netscape-format cookies.txt holding the feed credentials
        #[arg(long, default_value = "./cookies.txt")]
        cookies_file: PathBuf,
        /// Output path for the harvested JSON array
        #[arg(long, default_value = "posts.json")]
        output: PathBuf,
    },
    /// Expose the harvester as an HTTP service (POST /scrape)
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
        /// Netscape-format cookies.txt holding the feed credentials
        #[arg(long, default_value = "./cookies.txt")]
        cookies_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::initialize(logging::LogDestination::Terminal);
    let cli = Cli::parse();

    let webdriver = WebDriverConfig {
        endpoint: cli.webdriver_url.clone(),
        ..WebDriverConfig::default()
    };

    let outcome = match cli.command {
        Commands::Scrape {
            profile_url,
            num_posts,
            cookies_file,
            output,
        } => scrape_once(&webdriver, &profile_url, num_posts, &cookies_file, &output).await,
        Commands::Serve { addr, cookies_file } => serve(webdriver, addr, cookies_file).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            harvest_error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn scrape_once(
    webdriver: &WebDriverConfig,
    profile_url: &str,
    num_posts: usize,
    cookies_file: &PathBuf,
    output: &PathBuf,
) -> AppResult<()> {
    let cookies = load_cookie_file(cookies_file)?;
    let mut session = WebDriverSession::start(webdriver).await?;
    let posts = harvest_posts(
        &mut session,
        profile_url,
        &cookies,
        &HarvestLimits::for_target(num_posts),
        &HarvestSettings::default(),
    )
    .await?;

    let path = write_posts_json(output, &posts)?;
    println!("Saved {} posts to {}", posts.len(), path.display());
    Ok(())
}

async fn serve(
    webdriver: WebDriverConfig,
    addr: SocketAddr,
    cookies_file: PathBuf,
) -> AppResult<()> {
    let state = Arc::new(server::AppState {
        cookies_file,
        webdriver,
        settings: HarvestSettings::default(),
    });
    let app = server::router(state);

    harvest_info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
