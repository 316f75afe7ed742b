//! lingua — command-line front end for the Lingua translator.
//!
//! ```text
//! lingua probe
//! lingua translate "Hello" --to es
//! lingua ocr sign.png --to en
//! lingua serve --listen 127.0.0.1:3000
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "lingua",
    about = "Lingua — translation through a local service or a hosted model",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to lingua.toml (default: ./lingua.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the local translation service and check it end to end
    Probe,
    /// Detect the language of a text
    Detect { text: String },
    /// Translate a text, detecting its language unless --from is given
    Translate {
        text: String,
        /// Target language code
        #[arg(long)]
        to: String,
        /// Source language code
        #[arg(long)]
        from: Option<String>,
    },
    /// Extract text from an image and translate it
    Ocr {
        image: PathBuf,
        #[arg(long)]
        to: String,
    },
    /// Print the placeholder audio for a text as a data URL
    Speak {
        text: String,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Run the HTTP gateway
    Serve {
        /// Address to listen on (overrides [gateway].listen)
        #[arg(long)]
        listen: Option<String>,
    },
    /// Manage lingua.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a lingua.toml with every default, or write it to --path
    Init {
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,lingua=info")),
        )
        .init();

    let cli = Cli::parse();
    let load = || commands::config::load(cli.config.as_deref());

    match &cli.command {
        Commands::Probe => commands::backend::probe(&load()?).await,
        Commands::Detect { text } => commands::backend::detect(&load()?, text).await,
        Commands::Translate { text, to, from } => {
            commands::backend::translate(&load()?, text, to, from.as_deref()).await
        }
        Commands::Ocr { image, to } => commands::ocr::ocr(&load()?, image, to).await,
        Commands::Speak { text, lang } => commands::speak::speak(text, lang.as_deref()),
        Commands::Serve { listen } => commands::serve::serve(&load()?, listen.as_deref()).await,
        Commands::Config { action } => match action {
            ConfigAction::Init { path } => commands::config::init(path.as_deref()),
        },
    }
}
