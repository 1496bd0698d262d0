use clap::{Parser, Subcommand, ValueEnum};
use keyweave::prelude::*;
use keyweave::services::OperationRecord;
use serde_json::Value;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Output style for a compiled tree.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Box-drawing tree for humans
    Tree,
    /// Engine JSON
    Json,
}

/// Compile and inspect keyweave action graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log verbosity filter, e.g. "debug" or "keyweave=trace"
    #[arg(short, long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a graph into an action tree
    Compile {
        /// Graph snapshot or stored operation record (JSON)
        path: String,
        #[arg(short, long, value_enum, default_value = "tree")]
        format: OutputFormat,
    },
    /// Rewrite a graph with explicit payload types, migrating legacy node data
    Migrate {
        /// Graph snapshot or stored operation record (JSON)
        path: String,
        /// Where to write the migrated snapshot; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Validate a graph and report tolerated anomalies
    Check {
        /// Graph snapshot or stored operation record (JSON)
        path: String,
        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Compile { path, format } => run_compile(&path, format),
        Command::Migrate { path, output } => run_migrate(&path, output.as_deref()),
        Command::Check { path, strict } => run_check(&path, strict),
    }
}

/// Reads either a `{nodes, edges}` snapshot or an operation record whose
/// nodes and edges are embedded JSON strings.
fn load_snapshot(path: &str) -> GraphSnapshot {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
    let value: Value = serde_json::from_str(&content)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", path, e)));

    let is_record = value.get("nodes").is_some_and(Value::is_string);
    let snapshot = if is_record {
        let record: OperationRecord = serde_json::from_value(value).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read operation record: {}", e))
        });
        (&record).into_snapshot()
    } else {
        value.into_snapshot()
    };
    snapshot.unwrap_or_else(|e| exit_with_error(&format!("Failed to load graph: {}", e)))
}

fn run_compile(path: &str, format: OutputFormat) {
    let snapshot = load_snapshot(path);
    let start = Instant::now();
    let compilation = Compiler::builder(snapshot)
        .build()
        .compile_with_diagnostics()
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));
    let elapsed = start.elapsed();

    for warning in &compilation.warnings {
        eprintln!("warning: {}", warning);
    }
    match format {
        OutputFormat::Tree => {
            print!("{}", DisplayTree::new(&compilation.tree));
            println!(
                "\n{} actions, depth {}, compiled in {:?}",
                compilation.tree.len(),
                compilation.tree.depth(),
                elapsed
            );
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&compilation.tree)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize tree: {}", e)));
            println!("{}", json);
        }
    }
}

fn run_migrate(path: &str, output: Option<&str>) {
    let snapshot = load_snapshot(path);
    let json = serde_json::to_string_pretty(&snapshot)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize snapshot: {}", e)));
    match output {
        Some(out) => {
            fs::write(out, json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", out, e)));
            eprintln!(
                "Migrated {} nodes and {} edges to '{}'",
                snapshot.nodes.len(),
                snapshot.edges.len(),
                out
            );
        }
        None => println!("{}", json),
    }
}

fn run_check(path: &str, strict: bool) {
    let snapshot = load_snapshot(path);
    let compilation = Compiler::builder(snapshot)
        .build()
        .compile_with_diagnostics()
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    if compilation.warnings.is_empty() {
        println!("OK: {} actions", compilation.tree.len());
        return;
    }
    for warning in &compilation.warnings {
        println!("warning: {}", warning);
    }
    if strict {
        exit_with_error(&format!(
            "{} warning(s) in strict mode",
            compilation.warnings.len()
        ));
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
