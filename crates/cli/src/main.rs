use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use factorbase_config::AppConfig;
use factorbase_core::{Factor, KbError};
use factorbase_index::{build_from_store, write_index};
use factorbase_query::{CollectionSummary, FactorCatalog, FactorLookup, IndexKey, QueryEngine};
use factorbase_store::DocumentStore;
use factorbase_validate::{SchemaSet, ValidationResult, ValidationSummary, Validator};

#[derive(Parser)]
#[command(name = "factorbase", about = "Index, query and validate the FactorBase knowledge base")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Document store root (overrides the config file)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Show passing documents and info-level logs
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Paper index operations
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
    /// Validate documents in the store
    Validate {
        /// Which documents to check
        #[arg(value_enum, default_value_t = ValidateTarget::All)]
        target: ValidateTarget,
    },
    /// Look up papers, measures and links
    Query {
        #[command(subcommand)]
        action: QueryAction,
        /// Print JSON without indentation
        #[arg(long, global = true)]
        compact: bool,
    },
    /// Browse the factor taxonomy
    Factors {
        #[command(subcommand)]
        action: FactorsAction,
    },
    /// Paper collection summary by market and asset class
    Summary,
}

#[derive(Subcommand)]
enum IndexAction {
    /// Rebuild papers_index.json from every paper file
    Build,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValidateTarget {
    Papers,
    Measures,
    Relations,
    Factors,
    All,
}

#[derive(Subcommand)]
enum QueryAction {
    /// Show one measure (e.g. BM, ROE_TTM)
    Measure { id: String },
    /// Show one paper (e.g. paper_001)
    Paper { id: String },
    /// All measures of a factor (e.g. Value)
    Factor { name: String },
    /// Paper-measure links of a paper
    PaperMeasures { id: String },
    /// List all papers
    ListPapers,
    /// List all measures
    ListMeasures,
    /// List all factor groups
    ListFactors,
    /// Papers studying a market
    Market { market: String },
    /// Papers on an asset class
    AssetClass { asset_class: String },
    /// Papers published in a year
    Year { year: i64 },
    /// Papers by an author (exact name, e.g. "Fama, E.")
    Author { name: String },
}

#[derive(Subcommand)]
enum FactorsAction {
    /// Show every factor
    List {
        /// Description language (en or zh)
        #[arg(long, default_value = "en")]
        lang: String,
    },
    /// Show one factor by name
    Get {
        name: String,
        #[arg(long, default_value = "en")]
        lang: String,
    },
    /// Factors of one style (Style, Quality, Risk, Sentiment)
    Style { style: String },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = resolve_config_path(&cli.config);
    let mut config = AppConfig::load_or_default(&config_path)?;
    if let Some(root) = cli.root {
        config.store.root = root;
    }
    info!(config = %config_path.display(), root = %config.store.root.display(), "configuration loaded");

    let store = DocumentStore::open(&config)?;

    let ok = match cli.command {
        Commands::Index { action } => match action {
            IndexAction::Build => cmd_index_build(&store)?,
        },
        Commands::Validate { target } => cmd_validate(&store, &config, target, cli.verbose)?,
        Commands::Query { action, compact } => cmd_query(&store, action, compact)?,
        Commands::Factors { action } => cmd_factors(&store, action)?,
        Commands::Summary => cmd_summary(&store)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Try the path as given, then next to the executable, then two levels up
/// (target/release/ -> project root).
fn resolve_config_path(config: &str) -> PathBuf {
    let given = PathBuf::from(config);
    if given.exists() {
        return given;
    }
    if let Ok(exe) = std::env::current_exe() {
        let exe_dir = exe.parent().unwrap_or(exe.as_path()).to_path_buf();
        let candidate = exe_dir.join(config);
        if candidate.exists() {
            return candidate;
        }
        if let Some(root) = exe_dir.parent().and_then(|p| p.parent()) {
            let candidate = root.join(config);
            if candidate.exists() {
                return candidate;
            }
        }
    }
    given
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

fn print_header(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "=".repeat(50));
}

// ── Index Commands ──────────────────────────────────────────────────

fn cmd_index_build(store: &DocumentStore) -> anyhow::Result<bool> {
    let build = build_from_store(store)?;
    println!("📚 Loaded {} papers", build.loaded);
    for (path, reason) in &build.skipped {
        println!("  ⚠️  skipped {}: {}", path.display(), reason);
    }

    let path = write_index(store, &build.index)?;
    println!("✅ Index saved to {}", path.display());

    let stats = build.index.stats();
    println!();
    println!("Index statistics:");
    println!("  Markets: {}", stats.markets);
    println!("  Asset classes: {}", stats.asset_classes);
    println!("  Years: {}", stats.years);
    println!("  Authors: {}", stats.authors);
    Ok(true)
}

// ── Validate Commands ───────────────────────────────────────────────

fn cmd_validate(
    store: &DocumentStore,
    config: &AppConfig,
    target: ValidateTarget,
    verbose: bool,
) -> anyhow::Result<bool> {
    let schemas = if config.validation.use_schemas {
        SchemaSet::load(store)
    } else {
        SchemaSet::none()
    };
    if schemas.is_empty() {
        println!("⚠️  No schema files found, running field-level checks only");
    }
    let validator = Validator::new(store, config.validation.paper_id_rule, schemas);
    let everything = target == ValidateTarget::All;
    let mut all_results = Vec::new();

    if everything || target == ValidateTarget::Papers {
        println!("\n📄 Validating papers...");
        let results = batch_or_empty(validator.validate_all_papers(), store.papers_dir());
        report_results(&results, verbose);
        all_results.extend(results);
    }

    if everything || target == ValidateTarget::Measures {
        println!("\n📊 Validating measures...");
        let results = batch_or_empty(validator.validate_all_measures(), store.measures_dir());
        report_results(&results, verbose);
        all_results.extend(results);
    }

    if everything || target == ValidateTarget::Relations {
        println!("\n🔗 Validating relations...");
        let results = batch_or_empty(validator.validate_relations(), store.relations_path());
        if results.is_empty() {
            println!("  ⚠️  {} does not exist", store.relations_path().display());
        }
        report_results(&results, verbose);
        all_results.extend(results);
    }

    if everything || target == ValidateTarget::Factors {
        println!("\n🧭 Validating factor taxonomy...");
        if everything && !store.factors_path().exists() {
            println!("  ⚠️  {} does not exist", store.factors_path().display());
        } else {
            let result = validator.validate_factors();
            report_results(std::slice::from_ref(&result), verbose);
            all_results.push(result);
        }
    }

    let summary = ValidationSummary::from_results(&all_results);
    println!();
    println!("{}", "=".repeat(50));
    println!("📋 Validation summary: {}/{} passed", summary.passed, summary.total);
    if summary.all_passed() {
        println!("   ✅ All documents are valid!");
    } else {
        println!("   ❌ {} document(s) have errors", summary.failed);
    }
    Ok(summary.all_passed())
}

/// A missing collection is reported and treated as empty; any other loader
/// failure becomes a failed result for `path` so the run still gets a tally.
fn batch_or_empty(
    results: factorbase_core::Result<Vec<ValidationResult>>,
    path: &Path,
) -> Vec<ValidationResult> {
    match results {
        Ok(results) => results,
        Err(KbError::NotFound(what)) => {
            println!("  ⚠️  {what} not found");
            Vec::new()
        }
        Err(e) => vec![ValidationResult::with_errors(path, vec![e.to_string()])],
    }
}

fn report_results(results: &[ValidationResult], verbose: bool) {
    for result in results {
        if verbose || !result.is_valid() {
            let status = if result.is_valid() { "✅" } else { "❌" };
            println!("  {status} {}", result.label());
            for error in &result.errors {
                println!("      └─ {error}");
            }
        }
        if verbose || !result.warnings.is_empty() {
            for warning in &result.warnings {
                println!("      ⚠️  {warning}");
            }
        }
    }
}

// ── Query Commands ──────────────────────────────────────────────────

fn cmd_query(store: &DocumentStore, action: QueryAction, compact: bool) -> anyhow::Result<bool> {
    let engine = QueryEngine::new(store);

    match action {
        QueryAction::Measure { id } => match engine.measure(&id) {
            Ok(measure) => {
                print_header(&format!("📊 Measure: {id}"));
                print_json(&measure, compact)?;
            }
            Err(e) => return not_found(e),
        },
        QueryAction::Paper { id } => match engine.paper(&id) {
            Ok(paper) => {
                print_header(&format!("📄 Paper: {id}"));
                print_json(&paper, compact)?;
            }
            Err(e) => return not_found(e),
        },
        QueryAction::Factor { name } => match engine.measures_by_factor(&name) {
            Ok(FactorLookup::Found { factor, measures }) => {
                print_header(&format!("📁 Factor: {factor} ({} measures)", measures.len()));
                print_json(&measures, compact)?;
            }
            Ok(FactorLookup::Empty { factor }) => {
                print_header(&format!("📁 Factor: {factor} (0 measures)"));
                println!("Factor exists but lists no measures");
            }
            Ok(FactorLookup::UnknownFactor) => {
                println!("❌ Factor not found: {name}");
                return Ok(false);
            }
            Err(e) => return not_found(e),
        },
        QueryAction::PaperMeasures { id } => {
            let links = engine.paper_measures(&id)?;
            print_header(&format!("🔗 Paper-Measure Links for {id} ({} links)", links.len()));
            if links.is_empty() {
                println!("No links found");
            } else {
                print_json(&links, compact)?;
            }
        }
        QueryAction::ListPapers => {
            let papers = engine.list_papers()?;
            print_header(&format!("📚 All Papers ({} papers)", papers.len()));
            print_json(&papers, compact)?;
        }
        QueryAction::ListMeasures => {
            let measures = engine.list_measures()?;
            print_header(&format!("📊 All Measures ({} measures)", measures.len()));
            print_json(&measures, compact)?;
        }
        QueryAction::ListFactors => {
            let factors = engine.list_factors()?;
            print_header(&format!("📁 All Factors ({} factors)", factors.len()));
            print_json(&factors, compact)?;
        }
        QueryAction::Market { market } => {
            let papers = engine.papers_by(&IndexKey::Market(market.clone()))?;
            print_header(&format!("🌏 Market: {market} ({} papers)", papers.len()));
            print_json(&papers, compact)?;
        }
        QueryAction::AssetClass { asset_class } => {
            let papers = engine.papers_by(&IndexKey::AssetClass(asset_class.clone()))?;
            print_header(&format!("💼 Asset class: {asset_class} ({} papers)", papers.len()));
            print_json(&papers, compact)?;
        }
        QueryAction::Year { year } => {
            let papers = engine.papers_by(&IndexKey::Year(year))?;
            print_header(&format!("📅 Year: {year} ({} papers)", papers.len()));
            print_json(&papers, compact)?;
        }
        QueryAction::Author { name } => {
            let papers = engine.papers_by(&IndexKey::Author(name.clone()))?;
            print_header(&format!("✍️  Author: {name} ({} papers)", papers.len()));
            print_json(&papers, compact)?;
        }
    }
    Ok(true)
}

/// `NotFound` is an answer, not a crash: report it and fail the exit code.
fn not_found(err: KbError) -> anyhow::Result<bool> {
    match err {
        KbError::NotFound(what) => {
            println!("❌ Not found: {what}");
            Ok(false)
        }
        other => Err(other.into()),
    }
}

// ── Factor Taxonomy Commands ────────────────────────────────────────

fn cmd_factors(store: &DocumentStore, action: FactorsAction) -> anyhow::Result<bool> {
    let catalog = match FactorCatalog::from_store(store) {
        Ok(c) => c,
        Err(e) => return not_found(e),
    };

    match action {
        FactorsAction::List { lang } => {
            println!("{}", "=".repeat(60));
            println!("FactorBase - Factors Taxonomy (v{})", catalog.version());
            println!("Last Updated: {}", catalog.last_updated());
            println!("Total Factors: {}", catalog.list_all().len());
            println!("{}", "=".repeat(60));
            for factor in catalog.list_all() {
                display_factor(factor, &lang);
            }
        }
        FactorsAction::Get { name, lang } => match catalog.by_name(&name) {
            Some(factor) => display_factor(factor, &lang),
            None => {
                println!("Factor '{name}' not found");
                return Ok(false);
            }
        },
        FactorsAction::Style { style } => {
            let factors = catalog.by_style(&style);
            if factors.is_empty() {
                println!("No factors found with style '{style}'");
            } else {
                println!("\nFactors with style '{style}':");
                for factor in factors {
                    println!("  - {} (ID: {})", factor.factor_name, factor.factor_id);
                }
            }
        }
    }
    Ok(true)
}

fn display_factor(factor: &Factor, lang: &str) {
    println!("\n{}", "=".repeat(60));
    println!("Factor ID: {}", factor.factor_id);
    println!("Name: {}", factor.factor_name);
    match factor.style_kind() {
        Some(style) => println!("Style: {style}"),
        None => println!("Style: {} (unrecognised)", factor.style),
    }
    println!("\nDescription ({lang}):");
    println!("{}", factor.description_in(lang));
    println!("{}", "=".repeat(60));
}

// ── Summary ─────────────────────────────────────────────────────────

/// Reads the paper files directly so the report never reflects a stale index.
fn cmd_summary(store: &DocumentStore) -> anyhow::Result<bool> {
    let build = build_from_store(store)?;
    for (path, reason) in &build.skipped {
        println!("⚠️  skipped {}: {}", path.display(), reason);
    }
    let index = build.index;
    let summary = CollectionSummary::from_index(&index);

    print_header("PAPERS COLLECTION SUMMARY");
    println!("Total papers: {}", summary.total);
    print_counts("By Market:", &summary.by_market);
    print_counts("By Asset Class:", &summary.by_asset_class);

    print_header("PAPERS LIST");
    for paper in index.by_id.values() {
        println!();
        println!("📄 {}", relative_name(&store.paper_path(&paper.paper_id), store.root()));
        println!("   ID: {}", paper.paper_id);
        println!("   Title: {}", paper.title);
        println!("   Authors: {}", paper.authors);
        println!("   Year: {}", paper.year);
        println!("   Journal: {}", paper.journal);
        println!("   Market: {}", paper.market);
        println!("   Asset Class: {}", paper.asset_class);
        println!("   Conclusion: {}", paper.conclusion_sign);
        println!("   Replicable: {}", paper.replicable);
    }
    Ok(true)
}

fn print_counts(title: &str, counts: &std::collections::BTreeMap<String, usize>) {
    println!();
    println!("{title}");
    for (key, count) in counts {
        println!("  • {key}: {count}");
    }
}

fn relative_name(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
