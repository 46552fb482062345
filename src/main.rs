//! CoinMarketCap Top-N notifier CLI
//!
//! Command-line interface for rendering, linting and previewing message
//! templates.

use clap::{Parser, Subcommand};
use cmc_top_bot::{
    lint, source, Composer, Config, ContextBuilder, Error, Map, Renderer, Result, Snapshot, Value,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cmc-top-bot")]
#[command(about = "CoinMarketCap Top-N entrant notifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template against a JSON context
    Render {
        /// Template file
        #[arg(short, long)]
        template: PathBuf,

        /// JSON object used as the root context
        #[arg(long)]
        context: Option<PathBuf>,

        /// Extra root values as key=value (value parsed as JSON, else a string)
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, Value)>,

        /// Fail instead of truncating templates nested past the depth limit
        #[arg(long)]
        strict: bool,
    },

    /// Check templates for malformed directives
    Lint {
        /// Template files
        #[arg(required = true)]
        templates: Vec<PathBuf>,
    },

    /// Compose the message for a listing snapshot
    Preview {
        /// JSON file with new_coins, exited_coins and recent_posts
        #[arg(short, long)]
        snapshot: PathBuf,

        /// File holding a model-written reply to use instead of the fallback template
        #[arg(long)]
        ai_response: Option<PathBuf>,

        /// Print the rendered prompt before the message
        #[arg(long)]
        show_prompt: bool,

        /// Format the message for Telegram's HTML parse mode
        #[arg(long)]
        telegram_html: bool,
    },

    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for rendered text
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Load config
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    config.apply_env()?;
    config.validate()?;

    match cli.command {
        Commands::Render {
            template,
            context,
            set,
            strict,
        } => {
            run_render(&config, &template, context.as_deref(), set, strict)?;
        }
        Commands::Lint { templates } => {
            run_lint(&templates)?;
        }
        Commands::Preview {
            snapshot,
            ai_response,
            show_prompt,
            telegram_html,
        } => {
            run_preview(
                &config,
                &snapshot,
                ai_response.as_deref(),
                show_prompt,
                telegram_html,
            )?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value = serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

fn load_context(path: &Path) -> Result<Map> {
    match serde_json::from_str::<Value>(&source::load(path)?)? {
        Value::Map(map) => Ok(map),
        _ => Err(Error::InvalidArgument(format!(
            "context {} must be a JSON object",
            path.display()
        ))),
    }
}

fn run_render(
    config: &Config,
    template_path: &Path,
    context_path: Option<&Path>,
    assignments: Vec<(String, Value)>,
    strict: bool,
) -> Result<()> {
    let template = source::load(template_path)?;
    let mut context = match context_path {
        Some(path) => load_context(path)?,
        None => Map::new(),
    };
    context.extend(assignments);

    tracing::debug!(
        template = %template_path.display(),
        keys = context.len(),
        strict = strict,
        "Rendering template"
    );

    let renderer = Renderer::new().with_max_depth(config.max_depth);
    let output = if strict {
        renderer.render_checked(&template, &context)?
    } else {
        renderer.render(&template, &context)
    };
    print!("{output}");
    Ok(())
}

fn run_lint(paths: &[PathBuf]) -> Result<()> {
    let mut total = 0;
    for path in paths {
        let template = source::load(path)?;
        let issues = lint(&template);
        if issues.is_empty() {
            tracing::info!(template = %path.display(), "Template OK");
        }
        for issue in &issues {
            let (line, column) = issue.position(&template);
            println!("{}:{}:{}: {}", path.display(), line, column, issue.kind);
        }
        total += issues.len();
    }

    if total > 0 {
        return Err(Error::Lint(total));
    }
    Ok(())
}

fn run_preview(
    config: &Config,
    snapshot_path: &Path,
    ai_response_path: Option<&Path>,
    show_prompt: bool,
    telegram_html: bool,
) -> Result<()> {
    let snapshot = Snapshot::from_file(snapshot_path)?;

    tracing::info!(
        new_coins = snapshot.new_coins.len(),
        exited_coins = snapshot.exited_coins.len(),
        recent_posts = snapshot.recent_posts.len(),
        "Building preview"
    );

    if snapshot.new_coins.is_empty() {
        tracing::info!("No new entrants in snapshot");
    }

    let context = ContextBuilder::new(&config.project_name)
        .with_top_n(config.top_n)
        .with_convert(&config.convert)
        .with_snapshot(&snapshot)
        .build();

    let composer = Composer::new(Renderer::new().with_max_depth(config.max_depth))
        .with_telegram_html(config.telegram_html || telegram_html);

    if show_prompt {
        let prompt_template = source::load_or_default(&config.prompt_path, source::DEFAULT_PROMPT);
        println!("{}", composer.prompt(&prompt_template, &context));
        println!("---");
    }

    let ai_response = ai_response_path.map(source::load).transpose()?;
    let fallback =
        source::load_or_default(&config.template_path, source::DEFAULT_FALLBACK_TEMPLATE);
    let message = composer.compose(&fallback, ai_response.as_deref(), &context);

    tracing::info!(source = ?message.source, bytes = message.text.len(), "Composed message");
    if let Some(url) = snapshot.first_image_url() {
        tracing::info!(image_url = %url, "Message would be sent as a photo caption");
    }

    println!("{}", message.text);
    Ok(())
}
