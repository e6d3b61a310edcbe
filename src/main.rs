use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueHint};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{EnvFilter, fmt};

use flashgen::config::{DEFAULT_CONFIG_FILE, GeneratorConfig};
use flashgen::crud::DB;
use flashgen::generation::GenerationService;
use flashgen::llm::secrets::{API_KEY_ENV, lookup_api_key};
use flashgen::llm::{self, ChatClient, MockChatClient, OpenRouterClient, Sampling};
use flashgen::palette::Palette;
use flashgen::utils::{pluralize, trim_line};

#[derive(Parser, Debug)]
#[command(
    name = "flashgen",
    version,
    about = "Generate flashcard proposals from text with an LLM.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    /// Config file. Missing files are ignored.
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_FILE,
        value_hint = ValueHint::FilePath
    )]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate flashcard proposals and print them as JSON
    Generate {
        /// Source text file. Reads stdin when omitted or `-`.
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
        /// Use the offline mock client instead of OpenRouter
        #[arg(long, default_value_t = false)]
        mock: bool,
        /// User to record the generation for
        #[arg(long, value_name = "ID")]
        user: Option<String>,
    },
    /// Show recent generations
    History {
        /// Show failed generations instead
        #[arg(long, default_value_t = false)]
        errors: bool,
        #[arg(long, value_name = "COUNT", default_value_t = 10)]
        limit: u32,
        #[arg(long, value_name = "ID")]
        user: Option<String>,
    },
    /// Manage the OpenRouter API key
    Llm {
        /// Store a new API key in the local auth file
        #[arg(long, value_name = "KEY", conflicts_with = "clear")]
        set: Option<String>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key against OpenRouter
        #[arg(long, conflicts_with = "clear")]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = GeneratorConfig::load(&cli.config)?;

    match cli.command {
        Command::Generate { path, mock, user } => {
            let user_id = user.unwrap_or_else(|| config.user_id.clone());
            generate(&config, path, mock, &user_id).await?;
        }
        Command::History {
            errors,
            limit,
            user,
        } => {
            let user_id = user.unwrap_or_else(|| config.user_id.clone());
            let db = DB::new(&config.database_path()?).await?;
            if errors {
                print_errors(&db, &user_id, limit).await?;
            } else {
                print_generations(&db, &user_id, limit).await?;
            }
        }
        Command::Llm { set, clear, test } => handle_llm_command(&config, set, clear, test).await?,
    }

    Ok(())
}

async fn generate(
    config: &GeneratorConfig,
    path: Option<PathBuf>,
    mock: bool,
    user_id: &str,
) -> Result<()> {
    let source_text = read_source_text(path).await?;
    if trim_line(&source_text).is_none() {
        bail!("Source text is empty.");
    }

    let client: Arc<dyn ChatClient> = if mock {
        Arc::new(MockChatClient)
    } else {
        let api_key = llm::resolve_api_key()?;
        Arc::new(OpenRouterClient::new(
            &api_key,
            &config.api_base,
            config.timeout(),
        )?)
    };

    let db = DB::new(&config.database_path()?).await?;
    let chat_config = llm::flashcard_chat_config(
        &config.model,
        Sampling {
            temperature: config.temperature,
            top_p: config.top_p,
        },
    );
    let service = GenerationService::new(client, Arc::new(db), chat_config);

    let result = service.generate_flashcards(user_id, &source_text).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn read_source_text(path: Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read source text from {}", path.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read source text from stdin")?;
            Ok(text)
        }
    }
}

async fn print_generations(db: &DB, user_id: &str, limit: u32) -> Result<()> {
    let rows = db.recent_generations(user_id, limit).await?;
    println!(
        "{} for {}",
        pluralize("generation", rows.len()),
        Palette::paint(Palette::ACCENT, user_id)
    );
    for row in rows {
        println!(
            "#{} {} {} in {}ms via {} {}",
            row.id,
            row.created_at.format("%Y-%m-%d %H:%M"),
            Palette::paint(
                Palette::SUCCESS,
                pluralize("card", row.generated_count as usize)
            ),
            row.generation_duration,
            Palette::paint(Palette::INFO, &row.model),
            Palette::dim(short_hash(&row.source_text_hash)),
        );
    }
    Ok(())
}

async fn print_errors(db: &DB, user_id: &str, limit: u32) -> Result<()> {
    let rows = db.recent_generation_errors(user_id, limit).await?;
    println!(
        "{} for {}",
        pluralize("failed generation", rows.len()),
        Palette::paint(Palette::ACCENT, user_id)
    );
    for row in rows {
        println!(
            "#{} {} {} {} {}",
            row.id,
            row.created_at.format("%Y-%m-%d %H:%M"),
            Palette::paint(Palette::DANGER, &row.error_code),
            row.error_message,
            Palette::dim(short_hash(&row.source_text_hash)),
        );
    }
    Ok(())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

async fn handle_llm_command(
    config: &GeneratorConfig,
    set: Option<String>,
    clear: bool,
    test: bool,
) -> Result<()> {
    let mut action_taken = false;

    if let Some(key) = set {
        llm::store_api_key(&key)?;
        println!("Stored OpenRouter API key in the local auth file.");
        action_taken = true;
    }

    if clear {
        if llm::clear_api_key()? {
            println!("Removed the stored OpenRouter API key.");
        } else {
            println!("No OpenRouter API key found in the auth file.");
        }
        action_taken = true;
    }

    if test {
        let (key, source) = lookup_api_key()?.ok_or_else(|| {
            anyhow!(
                "No API key configured. Set {} or run `flashgen llm --set <KEY>`.",
                API_KEY_ENV
            )
        })?;
        let client = OpenRouterClient::new(&key, &config.api_base, config.timeout())?;
        client.healthcheck().await?;
        println!("OpenRouter API key from the {} is valid.", source.description());
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}
