mod config_cmd;
mod doctor_cmd;
mod enhance_cmd;
mod models_cmd;
mod recognize_cmd;
mod terminal_output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use wordbot_config::{config_dir, config_file_path, load_and_prepare, process_env, BackendKind};
use wordbot_core::RecognitionMode;
use wordbot_understanding::agent_info;

#[derive(Parser)]
#[command(name = "wordbot")]
#[command(about = "wordbot: read the words in an image")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $WORDBOT_CONFIG_DIR/config.yaml or ~/.wordbot/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Gemini,
    Vision,
    Tesseract,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Gemini => BackendKind::Gemini,
            BackendArg::Vision => BackendKind::Vision,
            BackendArg::Tesseract => BackendKind::Tesseract,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Single,
    Multi,
}

impl From<ModeArg> for RecognitionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Single => RecognitionMode::SingleWord,
            ModeArg::Multi => RecognitionMode::MultipleWords,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize the text in an image
    Recognize {
        image: PathBuf,
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Instruction sent with the image (hosted model backends)
        #[arg(long)]
        prompt: Option<String>,
        /// Run the local enhancement pre-pass first
        #[arg(long)]
        enhance: bool,
        /// Run the staged agent pipeline and print its report
        #[arg(long)]
        agent: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also list individual words (Cloud Vision and Tesseract)
        #[arg(long)]
        words: bool,
    },
    /// Write an enhanced or binarized copy of an image
    Enhance {
        input: PathBuf,
        output: PathBuf,
        /// Black-and-white output for Tesseract instead of color enhancement
        #[arg(long)]
        binarize: bool,
        /// Grayscale contrast equalization (CLAHE) instead of color enhancement
        #[arg(long, conflicts_with = "binarize")]
        equalize: bool,
        /// Resize to this height, keeping the aspect ratio
        #[arg(long)]
        height: Option<u32>,
    },
    /// Check configuration, the local OCR engine and API credentials
    Doctor,
    /// List Gemini models that support generateContent
    Models,
    /// Show the agent's name, version and stages
    Info {
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
    /// Write a config file with every default spelled out
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let (config, findings) = load_and_prepare(&config_path, &process_env()).await?;

    let log_dir = config.logging.as_ref().and_then(|l| l.dir.as_deref()).map(Path::new);
    wordbot_logging::init_logger(config.log_level(), log_dir);
    debug!(path = %config_path.display(), backend = config.backend().as_str(), "Config loaded");

    // doctor prints the findings itself; config show/init must work on a broken file.
    match cli.command {
        Commands::Doctor => {}
        Commands::Config { .. } => config_cmd::check_findings(&findings, false)?,
        _ => config_cmd::check_findings(&findings, true)?,
    }

    match cli.command {
        Commands::Recognize {
            image,
            backend,
            mode,
            prompt,
            enhance,
            agent,
            json,
            words,
        } => {
            let args = recognize_cmd::RecognizeArgs {
                image,
                backend: backend.map(Into::into),
                mode: mode.map(Into::into),
                prompt,
                enhance,
                agent,
                json,
                words,
            };
            recognize_cmd::run(&config, args).await?;
        }
        Commands::Enhance {
            input,
            output,
            binarize,
            equalize,
            height,
        } => {
            let recipe = if binarize {
                enhance_cmd::Recipe::Binarize
            } else if equalize {
                enhance_cmd::Recipe::Equalize
            } else {
                enhance_cmd::Recipe::Enhance
            };
            enhance_cmd::run(&input, &output, recipe, height).await?;
        }
        Commands::Doctor => doctor_cmd::run(&config, &config_path).await?,
        Commands::Models => models_cmd::run(&config).await?,
        Commands::Info { json } => {
            let info = agent_info();
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{} v{}", info.name, info.version);
                for (i, stage) in info.stages.iter().enumerate() {
                    println!("  {}. {stage}", i + 1);
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(&config, &config_path)?,
            ConfigAction::Init { force } => config_cmd::init(&config_path, force).await?,
        },
    }

    Ok(())
}
