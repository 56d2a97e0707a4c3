//! Feedload CLI - normalize supplier feeds and import them into a catalog
//!
//! # Main Commands
//!
//! ```bash
//! feedload import feed.csv --config acme.json   # Parse, validate and upsert into the catalog
//! feedload parse feed.csv --config acme.json    # Print canonical products as JSON
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! feedload records feed.csv            # Just load raw records to JSON
//! feedload validate products.json      # Validate canonical product documents
//! feedload check-config acme.json      # Validate a provider config
//! feedload transforms                  # List registered transforms
//! ```

use clap::{Parser, Subcommand};
use feedload::models::CanonicalProduct;
use feedload::persist::{PersistOptions, UniqueIdentifier};
use feedload::store::file::DEFAULT_CATALOG_PATH;
use feedload::transform::{parse_records, run_pipeline_with_report};
use feedload::{
    load_records, load_provider_config, parse_csv_bytes, validate, validate_document, ConfigError,
    JsonFileCatalog, ParseReport, PipelineOptions, ValidationMode, DEFAULT_REGISTRY,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "feedload")]
#[command(about = "Normalize supplier product feeds and import them into a catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV / JSON / NDJSON file and output raw records as JSON
    Records {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Map records through a provider config and output canonical products
    Parse {
        /// Input file
        input: PathBuf,

        /// Provider config JSON
        #[arg(short, long)]
        config: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full pipeline: records → canonical products → catalog
    Import {
        /// Input file
        input: PathBuf,

        /// Provider config JSON
        #[arg(short, long)]
        config: PathBuf,

        /// Catalog file
        #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
        catalog: PathBuf,

        /// Product match key: supplier_sku, handle, title, vendor, product_type
        #[arg(short, long, default_value = "supplier_sku")]
        unique_identifier: String,

        /// Inventory location (default: FEEDLOAD_DEFAULT_LOCATION)
        #[arg(long)]
        location: Option<String>,

        /// Unit cost currency (default: FEEDLOAD_CURRENCY or USD)
        #[arg(long)]
        currency: Option<String>,

        /// Required canonical path, repeatable (default: title)
        #[arg(long = "require")]
        required: Vec<String>,

        /// Skip products that fail validation instead of importing them
        #[arg(long)]
        skip_invalid: bool,

        /// Stop after this many seconds (checked between records)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Validate canonical product JSON documents
    Validate {
        /// Input JSON file (one product or an array)
        input: PathBuf,

        /// Required canonical path, repeatable (default: title)
        #[arg(long = "require")]
        required: Vec<String>,
    },

    /// Validate a provider config and list its mappings
    CheckConfig {
        /// Provider config JSON
        config: PathBuf,
    },

    /// Show registered transforms
    Transforms,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Records { input, output } => cmd_records(&input, output.as_deref()),

        Commands::Parse {
            input,
            config,
            output,
        } => cmd_parse(&input, &config, output.as_deref()),

        Commands::Import {
            input,
            config,
            catalog,
            unique_identifier,
            location,
            currency,
            required,
            skip_invalid,
            timeout,
        } => {
            let args = ImportArgs {
                unique_identifier,
                location,
                currency,
                required,
                skip_invalid,
                timeout,
            };
            cmd_import(&input, &config, &catalog, args)
        }

        Commands::Validate { input, required } => cmd_validate(&input, &required),

        Commands::CheckConfig { config } => cmd_check_config(&config),

        Commands::Transforms => cmd_transforms(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_records(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading records: {}", input.display());

    let is_csv = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let records = if is_csv {
        let parsed = parse_csv_bytes(&fs::read(input)?)?;
        eprintln!("   Encoding: {}", parsed.encoding);
        eprintln!("   Delimiter: '{}'", format_delimiter(parsed.delimiter));
        eprintln!("   Columns: {}", parsed.headers.join(", "));
        parsed.records
    } else {
        load_records(input)?
    };
    eprintln!("✅ Loaded {} records", records.len());

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_parse(input: &Path, config_path: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let config = load_provider_config(config_path)?;
    let issues = config.check_transforms(&DEFAULT_REGISTRY);
    if !issues.is_empty() {
        return Err(ConfigError::Invalid {
            source_name: config_path.display().to_string(),
            issues,
        }
        .into());
    }

    let records = load_records(input)?;
    eprintln!("   Provider: {}", config.provider_id);
    eprintln!("   Records: {}", records.len());

    let mut report = ParseReport::new();
    let products: Result<Vec<CanonicalProduct>, _> =
        parse_records(records, &config, &DEFAULT_REGISTRY, &mut report).collect();

    print_parse_errors(&report);
    let products = products?;
    eprintln!("✅ Parsed {} products", products.len());

    let json = serde_json::to_string_pretty(&products)?;
    write_output(&json, output)?;

    Ok(())
}

struct ImportArgs {
    unique_identifier: String,
    location: Option<String>,
    currency: Option<String>,
    required: Vec<String>,
    skip_invalid: bool,
    timeout: Option<u64>,
}

fn cmd_import(
    input: &Path,
    config_path: &Path,
    catalog_path: &Path,
    args: ImportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let unique_identifier: UniqueIdentifier = args.unique_identifier.parse()?;
    let mut persist = PersistOptions::from_env(unique_identifier);
    if args.location.is_some() {
        persist.default_location = args.location;
    }
    if let Some(currency) = args.currency {
        persist.currency = currency;
    }

    let mut options = PipelineOptions {
        persist,
        deadline: args.timeout.map(|secs| Instant::now() + Duration::from_secs(secs)),
        ..Default::default()
    };
    if !args.required.is_empty() {
        options.required_fields = args.required;
    }
    if args.skip_invalid {
        options.validation = ValidationMode::SkipInvalid;
    }

    let records = load_records(input)?;
    eprintln!("   Records: {}", records.len());
    eprintln!("   Catalog: {}", catalog_path.display());

    let mut store = JsonFileCatalog::open(catalog_path)?;
    let mut report = ParseReport::new();
    let result = run_pipeline_with_report(records, config_path, &mut store, &options, &mut report);
    print_parse_errors(&report);

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(partial) = e.partial_summary() {
                eprintln!(
                    "   Committed before failure: {} products created, {} updated",
                    partial.products_created, partial.products_updated
                );
            }
            return Err(e.into());
        }
    };

    eprintln!("\n📊 Results:");
    eprintln!(
        "   Products: {} created, {} updated",
        summary.products_created, summary.products_updated
    );
    eprintln!(
        "   Variants: {} created, {} updated",
        summary.variants_created, summary.variants_updated
    );
    eprintln!("   Images: {} created, {} updated", summary.images_created, summary.images_updated);

    println!("{}", serde_json::to_string_pretty(&summary)?);

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_validate(input: &Path, required: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let documents = match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => items,
        single => vec![single],
    };

    let required: Vec<&str> = if required.is_empty() {
        feedload::validation::DEFAULT_REQUIRED_FIELDS.to_vec()
    } else {
        required.iter().map(String::as_str).collect()
    };

    let mut valid = 0;
    let mut invalid = 0;

    for (i, document) in documents.iter().enumerate() {
        let mut issues = validate_document(document);
        if issues.is_empty() {
            let product: CanonicalProduct = serde_json::from_value(document.clone())?;
            issues = validate(&product, &required);
        }

        if issues.is_empty() {
            valid += 1;
        } else {
            invalid += 1;
            if invalid <= 5 {
                eprintln!("\n❌ Product {} invalid:", i);
                for issue in issues.iter().take(3) {
                    eprintln!("   - {}: {}", issue.path, issue.message);
                }
            }
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check_config(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking config: {}", config_path.display());

    let config = load_provider_config(config_path)?;
    let issues = config.check_transforms(&DEFAULT_REGISTRY);
    if !issues.is_empty() {
        return Err(ConfigError::Invalid {
            source_name: config_path.display().to_string(),
            issues,
        }
        .into());
    }

    println!("Provider: {}", config.provider_id);
    println!("Error policy: {}", config.error_policy.as_str());
    println!("Schema version: {}", config.schema_version.as_str());
    println!("\nMappings ({}):", config.mappings.len());
    for rule in &config.mappings {
        let kind = rule.target.kind().map_or("any", |k| k.describe());
        let chain: Vec<&str> = rule.transforms.iter().map(|t| t.name.as_str()).collect();
        println!("  {} → {} ({})", rule.source.as_str(), rule.destination, kind);
        if !chain.is_empty() {
            println!("     transforms: {}", chain.join(" → "));
        }
        if let Some(default) = &rule.default {
            println!("     default: {}", default);
        }
    }

    eprintln!("\n✅ Config is valid");
    Ok(())
}

fn cmd_transforms() -> Result<(), Box<dyn std::error::Error>> {
    println!("Registered transforms:");
    for name in DEFAULT_REGISTRY.names() {
        println!("  - {}", name);
    }
    Ok(())
}

fn print_parse_errors(report: &ParseReport) {
    if report.is_empty() {
        return;
    }
    eprintln!("\n⚠️  {} parse errors:", report.error_count());
    for error in report.errors().iter().take(10) {
        eprintln!(
            "   Record {} [{} → {}]: {}",
            error.record_index,
            error.source.as_deref().unwrap_or("?"),
            error.destination.as_deref().unwrap_or("?"),
            error.message
        );
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
