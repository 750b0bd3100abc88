use clap::{Parser, Subcommand};
use itertools::Itertools;
use snapchain_codegen::prelude::*;
use snapchain_codegen::refine::{HttpRefinementClient, HttpRefinementConfig};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Generate Solana program source from a saved block workspace
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the generated source for a workspace
    Generate {
        /// Path to the structured workspace JSON file
        workspace: PathBuf,
        /// Print generation statistics to stderr
        #[arg(long)]
        report: bool,
    },
    /// Print the human-readable outline of a workspace
    Summary {
        workspace: PathBuf,
        /// Print the normalized JSON form instead
        #[arg(long)]
        json: bool,
    },
    /// List every registered block type
    Catalog,
    /// Ask the refinement service to rewrite the generated source
    Refine {
        workspace: PathBuf,
        /// What to change
        #[arg(short, long)]
        instruction: String,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = CodegenConfig::load(cli.config.as_deref())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load configuration: {}", e)));
    let registry = Arc::new(Registry::with_default_catalog());

    match cli.command {
        Command::Generate { workspace, report } => {
            run_generate(&config, registry, &workspace, report).await
        }
        Command::Summary { workspace, json } => run_summary(registry, &workspace, json),
        Command::Catalog => run_catalog(&registry),
        Command::Refine {
            workspace,
            instruction,
        } => run_refine(&config, registry, &workspace, &instruction).await,
    }
}

/// `SNAPCHAIN_LOG_FORMAT=json` switches to machine-parseable output.
fn init_tracing() {
    let log_format = std::env::var("SNAPCHAIN_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "snapchain_codegen=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_workspace(registry: Arc<Registry>, path: &PathBuf) -> Graph {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workspace file '{}': {}",
            path.display(),
            e
        ))
    });
    let blocks = from_json(&source)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workspace JSON: {}", e)));
    blocks
        .into_graph(registry)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build block graph: {}", e)))
}

fn build_scheduler(config: &CodegenConfig, registry: Arc<Registry>) -> Scheduler {
    let emitter = Emitter::builder(registry)
        .with_config(config.emitter.clone())
        .build();
    Scheduler::new(Arc::new(emitter), config.scheduler.clone())
}

async fn run_generate(
    config: &CodegenConfig,
    registry: Arc<Registry>,
    workspace: &PathBuf,
    report: bool,
) {
    let graph = load_workspace(Arc::clone(&registry), workspace);
    let scheduler = build_scheduler(config, registry);

    let start = Instant::now();
    let (code, stats) = scheduler
        .generate_with_report(&graph)
        .await
        .unwrap_or_else(|e| {
            exit_with_error(&format!("Code generation failed at block '{}': {}", e.node_id(), e))
        });
    let duration = start.elapsed();

    print!("{code}");
    if report {
        eprintln!("\n--- Generation Report ---");
        eprintln!("  Nodes visited:  {}", stats.nodes_visited);
        eprintln!("  Roots rendered: {}", stats.roots_rendered);
        eprintln!("  Batches:        {}", stats.batches);
        eprintln!("  Used fallback:  {}", stats.used_fallback);
        eprintln!("  Duration:       {:?}", duration);
    }
}

fn run_summary(registry: Arc<Registry>, workspace: &PathBuf, json: bool) {
    let graph = load_workspace(registry, workspace);
    let blocks = to_structured(&graph);
    if json {
        let output = to_json(&blocks)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize workspace: {}", e)));
        println!("{output}");
    } else {
        print!("{}", to_summary(&blocks));
    }
}

fn run_catalog(registry: &Registry) {
    let by_category = registry
        .types()
        .into_group_map_by(|t| t.category.clone());
    let mut categories: Vec<_> = by_category.keys().cloned().collect();
    categories.sort();

    for category in categories {
        println!("{category}:");
        for node_type in &by_category[&category] {
            let kind = if node_type.produces_value {
                "expression"
            } else {
                "statement"
            };
            let fields = node_type.fields.iter().map(|f| f.name.as_str()).join(", ");
            let slots = node_type.slots.iter().map(|s| s.name.as_str()).join(", ");
            println!(
                "  {:<22} {:<10} fields: [{}] slots: [{}]",
                node_type.id, kind, fields, slots
            );
        }
    }
}

async fn run_refine(
    config: &CodegenConfig,
    registry: Arc<Registry>,
    workspace: &PathBuf,
    instruction: &str,
) {
    let graph = load_workspace(Arc::clone(&registry), workspace);
    let scheduler = build_scheduler(config, registry);
    let code = scheduler.generate(&graph).await.unwrap_or_else(|e| {
        exit_with_error(&format!("Code generation failed at block '{}': {}", e.node_id(), e))
    });

    let http_config = HttpRefinementConfig::from_config(&config.refinement)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let client = HttpRefinementClient::new(http_config)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to create HTTP client: {}", e)));
    let refiner = Refiner::new(client, config.refinement.clone());

    let blocks = to_structured(&graph);
    let refined = refiner
        .refine(&blocks, Some(code.as_str()), instruction)
        .await
        .unwrap_or_else(|e| exit_with_error(&format!("Refinement failed: {}", e)));
    println!("{refined}");
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
