mod cache;

use anyhow::Context;
use dialogue_script_converter::config::{Config, Environment};
use dialogue_script_converter::dialogue::naive;
use dialogue_script_converter::{ProviderKind, RequestContext, convert};
use std::io::Read;
use std::path::PathBuf;
use structopt::StructOpt;
use strum::{Display, EnumString};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
enum ConversionMode {
    OpenAi,
    Anthropic,
    Naive,
}

impl ConversionMode {
    fn provider_kind(self) -> Option<ProviderKind> {
        match self {
            ConversionMode::OpenAi => Some(ProviderKind::OpenAi),
            ConversionMode::Anthropic => Some(ProviderKind::Anthropic),
            ConversionMode::Naive => None,
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(
    name = "dialogue-script-converter",
    about = "Convert narrative text from stdin into visual-novel dialogue events"
)]
struct Args {
    /// Scene the text belongs to
    #[structopt(short, long, default_value = "SCENE_01")]
    scene: String,

    /// Sequence within the scene, used to derive choice targets
    #[structopt(short = "q", long)]
    sequence: Option<String>,

    /// Conversion mode (openai, anthropic or naive)
    #[structopt(short, long, default_value = "openai")]
    mode: ConversionMode,

    /// Path to provider settings TOML file
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Write the JSON events here instead of stdout
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// Skip the conversion cache
    #[structopt(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let environment = Environment::from_env()?;
    let args = Args::from_args();

    let config = match &args.config {
        Some(path) => Config::from_toml(
            &tokio::fs::read_to_string(path)
                .await
                .context("Failed to read settings file")?,
        )
        .context("Failed to parse settings TOML")?,
        None => Config::default(),
    };

    let mut input_text = String::new();
    std::io::stdin()
        .read_to_string(&mut input_text)
        .context("Failed to read input text from stdin")?;

    let context = RequestContext::new(Some(args.scene.as_str()), args.sequence.as_deref());

    let conversion_cache = if args.no_cache {
        None
    } else {
        Some(cache::ConversionCache::new().await?)
    };
    let cache_key = cache::ConversionCacheKey::new(args.mode, &context, input_text.trim());

    let cached_events = match &conversion_cache {
        Some(conversion_cache) => conversion_cache.get(&cache_key).await,
        None => None,
    };

    let events = if let Some(cached_events) = cached_events {
        tracing::info!("Using cached conversion");
        cached_events
    } else {
        tracing::info!(mode = %args.mode, scene = %context.scene_id, "Converting…");
        let events = match args.mode.provider_kind() {
            None => naive::produce(&input_text, &context)
                .context("Failed to convert text line by line")?,
            Some(kind) => {
                let provider = kind.build(&environment, &config)?;
                convert(provider.as_ref(), &input_text, &context)
                    .await
                    .with_context(|| format!("Failed to convert text with {kind}"))?
            }
        };
        tracing::info!("Converted.");

        if let Some(conversion_cache) = &conversion_cache {
            conversion_cache.insert(cache_key, &events).await;
        }
        events
    };

    let json = serde_json::to_string_pretty(&events).context("Failed to serialize events")?;
    match &args.output {
        Some(path) => tokio::fs::write(path, json)
            .await
            .context("Failed to write output file")?,
        None => println!("{json}"),
    }

    tracing::info!("Successfully produced {} dialogue events.", events.len());

    Ok(())
}
