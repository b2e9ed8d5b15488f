use clap::{Arg, ArgMatches, Command};
use leafy_i18n::config::Config;
use leafy_i18n::mt::{LibreTranslateProvider, MachineTranslator, MockMode, MockTranslator};
use leafy_i18n::store::{CacheStore, FileStore, MemoryStore};
use leafy_i18n::{PresentationNode, TranslationCache, TreeTranslator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn input_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("file")
                .help("JSON file to translate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("target-locale")
                .help("Target language code (e.g., fr, es, de)")
                .required(true)
                .index(2),
        )
}

fn cli() -> Command {
    Command::new("leafy-i18n")
        .version("0.1.0")
        .about("Translate presentation trees and JSON payloads with a persistent cache")
        .subcommand_required(true)
        .subcommand(input_args(
            Command::new("tree").about("Translate a presentation tree ({\"container\": [...]})"),
        ))
        .subcommand(input_args(
            Command::new("json").about("Translate every string leaf of a JSON document"),
        ))
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("JSON config file (default: LEAFY_* environment variables)"),
        )
        .arg(
            Arg::new("source-locale")
                .long("source")
                .short('s')
                .global(true)
                .help("Source language code, or 'auto'"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .short('e')
                .global(true)
                .help("Translate endpoint URL"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .help("Cache file; without it the cache lasts for this run only"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .global(true)
                .help("Use mock translator instead of the HTTP provider")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Log every request")
                .action(clap::ArgAction::SetTrue),
        )
}

fn load_config(matches: &ArgMatches) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(&PathBuf::from(path))?,
        None => Config::from_env()?,
    };
    if let Some(source) = matches.get_one::<String>("source-locale") {
        config.source_lang = source.clone();
    }
    if let Some(endpoint) = matches.get_one::<String>("endpoint") {
        config.endpoint = endpoint.clone();
    }
    if let Some(store) = matches.get_one::<String>("store") {
        config.store_path = Some(PathBuf::from(store));
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();
    // Global flags are propagated into the subcommand's matches
    let (command, sub) = matches
        .subcommand()
        .ok_or("A subcommand is required")?;
    let verbose = sub.get_flag("verbose");

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if verbose { "debug" } else { "info" })
            }),
        )
        .init();

    let config = load_config(sub)?;

    let store: Arc<dyn CacheStore> = match &config.store_path {
        Some(path) => Arc::new(FileStore::new(path)),
        None => Arc::new(MemoryStore::new()),
    };
    let cache = Arc::new(TranslationCache::open(store));

    let provider: Arc<dyn MachineTranslator> = if sub.get_flag("mock") {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        Arc::new(LibreTranslateProvider::from_config(&config)?)
    };
    info!(
        provider = provider.provider_name(),
        source = %config.source_lang,
        cached = cache.len(),
        "Translator ready"
    );
    let translator = TreeTranslator::from_config(provider, cache, &config);

    let file = sub
        .get_one::<String>("file")
        .ok_or("Missing input file")?;
    let target_locale = sub
        .get_one::<String>("target-locale")
        .ok_or("Missing target locale")?;
    leafy_i18n::mt::validate_locale(target_locale)?;

    let raw = std::fs::read_to_string(file)?;
    let output = match command {
        "tree" => {
            let mut tree: PresentationNode = serde_json::from_str(&raw)?;
            let report = translator.translate(&mut tree, target_locale).await;
            if report.failed > 0 {
                eprintln!("⚠️  {} leaves kept their original text", report.failed);
            }
            serde_json::to_string_pretty(&tree)?
        }
        "json" => {
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            let (translated, report) = translator.translate_value(&value, target_locale).await;
            if report.failed > 0 {
                eprintln!("⚠️  {} strings kept their original text", report.failed);
            }
            serde_json::to_string_pretty(&translated)?
        }
        other => return Err(format!("Unknown subcommand '{}'", other).into()),
    };

    println!("{}", output);
    Ok(())
}
