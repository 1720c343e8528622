use anyhow::Result;
use clap::{Parser, Subcommand};
use labeler::server::Server;
use labeler_core::config;
use labeler_core::config::AppConfig;
use labeler_core::pagination;
use labeler_core::store::ImageStore;
use labeler_core::StoreError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;
    init_tracing(&cfg.logging.level);

    match cli.command {
        Commands::Serve { addr, images_dir } => {
            if let Some(addr) = addr {
                cfg.server.addr = addr;
            }
            if let Some(dir) = images_dir {
                cfg.images.root = dir;
            }
            Server::new(&cfg)?.run().await
        }
        Commands::List { page, json } => run_list(&cfg, page, json),
    }
}

#[derive(Parser)]
#[command(name = "labeler")]
#[command(about = "Point annotation helper for image folders", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the labeling HTTP API
    Serve {
        /// Listen address, e.g. 127.0.0.1:5000
        #[arg(long)]
        addr: Option<String>,
        /// Folder holding unlabeled images
        #[arg(long)]
        images_dir: Option<String>,
    },
    /// Print one page of unlabeled images
    List {
        /// 1-indexed page number
        #[arg(short, long, default_value_t = 1, allow_hyphen_values = true)]
        page: i64,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run_list(cfg: &AppConfig, page: i64, json: bool) -> Result<()> {
    let store = ImageStore::new(cfg.images.root_dir(), &cfg.images.exclude)?;
    let images = match pagination::get_page(&store, page, cfg.images.page_size) {
        Ok(images) => images,
        Err(err @ StoreError::NoMoreResults { .. }) => {
            if json {
                println!("{}", serde_json::json!({ "error": err.to_string() }));
            } else {
                println!("{}", err);
            }
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "images": images }))?
        );
    } else {
        for name in images {
            println!("{}", name);
        }
    }
    Ok(())
}
