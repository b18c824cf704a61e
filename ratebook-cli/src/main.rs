use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratebook_cli::{default_cache_dir, parse_criterion};
use ratebook_core::storage::{CorpusStorage, FileStorage};
use ratebook_core::{
    calculate, AgentText, BuildOptions, CorpusConfig, CorpusProcessor, DocumentCorpus,
    QueryEngine, QueryResult, RenderOptions,
};

#[derive(Parser)]
#[command(name = "ratebook")]
#[command(about = "Look up rules and rate exhibits in insurance filing PDFs")]
struct Args {
    /// Folder with the rules manual and rate page PDFs
    #[arg(short, long, global = true, default_value = ".")]
    folder: PathBuf,

    /// Path to custom config file (YAML format)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Snapshot cache directory (default: ~/.local/share/ratebook/cache)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Ignore cached snapshots and reparse every document
    #[arg(long, global = true)]
    skip_cache: bool,

    /// Neither read nor write the snapshot cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Log per-step timings of the corpus build
    #[arg(long, global = true)]
    profile: bool,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Documents in the folder with rule and exhibit counts
    Summary,

    /// Keyword search over rule titles and content
    SearchRules {
        query: String,
        /// Only rules in this PART, e.g. C
        #[arg(short, long)]
        part: Option<char>,
        /// Only rules from documents whose name contains this text
        #[arg(short, long)]
        document: Option<String>,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Which PART letter a description like "rating plan" refers to
    FindPart { description: String },

    /// Rule titles in numeric order
    ListRules {
        #[arg(short, long)]
        part: Option<char>,
    },

    /// Exhibits whose name contains the given text
    FindExhibit { name: String },

    /// Exhibit headers plus sample rows, or rows mentioning a description
    ExtractTable {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Rank exhibits by how well their page text matches a description
    FindTable {
        description: String,
        #[arg(short, long)]
        document: Option<String>,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// First exhibit row matching every COLUMN=VALUE criterion
    FindValue {
        name: String,
        #[arg(required = true, value_parser = parse_criterion)]
        criteria: Vec<(String, String)>,
        /// Return only this column of the matching row
        #[arg(short, long = "return")]
        return_column: Option<String>,
    },

    /// Evaluate arithmetic such as "$293 * 2.061"
    Calculate { expression: String },

    /// Write the parsed corpus to a JSON file
    Export { output: PathBuf },

    /// List cached corpus snapshots
    CacheInfo,

    /// Delete all cached corpus snapshots
    CacheClear,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = CorpusConfig::load_with_fallback(args.config.as_deref());
    match &args.config {
        Some(config_path) => tracing::info!("📋 Loaded config from: {config_path}"),
        None => tracing::debug!("📋 Using default config"),
    }
    let options = RenderOptions::from(&config.limits);

    match &args.command {
        Command::Calculate { expression } => {
            let calculation = calculate(expression)
                .with_context(|| format!("Error calculating '{expression}'"))?;
            match args.format {
                OutputFormat::Text => println!("{}", calculation.agent_text(&options)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&calculation)?),
            }
            return Ok(());
        }
        Command::CacheInfo => return cache_info(&args),
        Command::CacheClear => {
            let removed = cache_storage(&args)?.clear()?;
            println!("🗑️  Removed {removed} cached snapshots");
            return Ok(());
        }
        _ => {}
    }

    let corpus = build_corpus(&args, &config)?;
    let engine = QueryEngine::new(&corpus, &config);

    match &args.command {
        Command::Summary => summary(&corpus, args.format, &options)?,
        Command::SearchRules {
            query,
            part,
            document,
            top_k,
        } => {
            let part = part.map(|p| p.to_ascii_uppercase());
            emit(
                &engine.search_rules(query, part, document.as_deref(), *top_k),
                args.format,
                &options,
            )?
        }
        Command::FindPart { description } => {
            emit(&engine.find_part_by_description(description), args.format, &options)?
        }
        Command::ListRules { part } => emit(
            &engine.list_rules(part.map(|p| p.to_ascii_uppercase())),
            args.format,
            &options,
        )?,
        Command::FindExhibit { name } => emit(&engine.find_exhibit(name), args.format, &options)?,
        Command::ExtractTable { name, description } => emit(
            &engine.extract_table(name, description.as_deref()),
            args.format,
            &options,
        )?,
        Command::FindTable {
            description,
            document,
            top_k,
        } => emit(
            &engine.find_exhibit_by_description(description, document.as_deref(), *top_k),
            args.format,
            &options,
        )?,
        Command::FindValue {
            name,
            criteria,
            return_column,
        } => {
            let criteria: Vec<(&str, &str)> = criteria
                .iter()
                .map(|(column, value)| (column.as_str(), value.as_str()))
                .collect();
            emit(
                &engine.find_value(name, &criteria, return_column.as_deref()),
                args.format,
                &options,
            )?
        }
        Command::Export { output } => {
            corpus.save_to_json(output)?;
            println!("💾 Corpus saved to: {}", output.display());
        }
        Command::Calculate { .. } | Command::CacheInfo | Command::CacheClear => {}
    }

    Ok(())
}

/// Logs go to stderr so query output on stdout stays machine-readable.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_cache_dir(args: &Args) -> Result<Option<PathBuf>> {
    if args.no_cache {
        return Ok(None);
    }
    match &args.cache_dir {
        Some(dir) => Ok(Some(dir.clone())),
        None => default_cache_dir().map(Some),
    }
}

fn cache_storage(args: &Args) -> Result<FileStorage> {
    let dir = match &args.cache_dir {
        Some(dir) => dir.clone(),
        None => default_cache_dir()?,
    };
    FileStorage::new(&dir)
}

fn build_corpus(args: &Args, config: &CorpusConfig) -> Result<DocumentCorpus> {
    let cache_dir = resolve_cache_dir(args)?;
    let processor = CorpusProcessor::new_cli(config, cache_dir.as_deref())?;
    let corpus = processor
        .build_from_folder(
            &args.folder,
            config,
            BuildOptions {
                skip_cache: args.skip_cache,
                profile: args.profile,
            },
        )
        .with_context(|| format!("Failed to build corpus from {}", args.folder.display()))?;
    Ok(corpus)
}

fn emit<T>(result: &QueryResult<T>, format: OutputFormat, options: &RenderOptions) -> Result<()>
where
    T: AgentText + Serialize,
{
    match format {
        OutputFormat::Text => println!("{}", result.render(options)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}

#[derive(Serialize)]
struct CorpusSummary<'a> {
    documents: &'a [ratebook_core::SourceDocument],
    rule_count: usize,
    exhibit_count: usize,
}

fn summary(corpus: &DocumentCorpus, format: OutputFormat, options: &RenderOptions) -> Result<()> {
    let engine = QueryEngine::with_defaults(corpus);
    match format {
        OutputFormat::Text => {
            println!("{}", engine.list_documents().render(options));
            println!(
                "\n📊 {} rules, {} exhibits",
                corpus.rules().len(),
                corpus.exhibits().len()
            );
        }
        OutputFormat::Json => {
            let summary = CorpusSummary {
                documents: corpus.documents(),
                rule_count: corpus.rules().len(),
                exhibit_count: corpus.exhibits().len(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn cache_info(args: &Args) -> Result<()> {
    let storage = cache_storage(args)?;
    let entries = storage.entries()?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            println!("📁 Cache directory: {}", storage.cache_dir().display());
            if entries.is_empty() {
                println!("   (empty)");
            }
            let mut total_bytes = 0;
            for entry in &entries {
                total_bytes += entry.size_bytes;
                let modified = entry
                    .modified
                    .map(|m| m.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!(
                    "   {} ({:.1} KB, {modified})",
                    entry.name,
                    entry.size_bytes as f64 / 1024.0
                );
            }
            println!("   {} snapshots, {:.1} KB total", entries.len(), total_bytes as f64 / 1024.0);
        }
    }
    Ok(())
}
