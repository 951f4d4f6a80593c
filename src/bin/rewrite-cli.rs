use std::path::PathBuf;

use clap::{Parser, Subcommand};

use url_rewrite::config::load_config;
use url_rewrite::{AggregatedRuleSet, Bootstrap};

#[derive(Parser)]
#[command(name = "rewrite-cli")]
#[command(about = "Inspect compiled URL rewrite rules", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "rewrite.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration
    Check,
    /// List compiled rules in evaluation order
    Rules {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which rule a request path hits
    Resolve {
        /// Request path, e.g. /old/abc
        path: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let rules = Bootstrap::new(config).build_rules()?;

    match cli.command {
        Commands::Check => {
            println!("{}: OK ({} rules)", cli.config.display(), rules.len());
        }
        Commands::Rules { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(rules.rules())?);
            } else {
                print_rules(&rules);
            }
        }
        Commands::Resolve { path } => match rules.evaluate(&path) {
            Some(rewrite) => println!("{} -> {} {}", path, rewrite.action, rewrite.destination),
            None => println!("{} -> no match (pass through)", path),
        },
    }

    Ok(())
}

fn print_rules(rules: &AggregatedRuleSet) {
    if rules.is_empty() {
        println!("No rules configured");
        return;
    }

    let width = rules
        .rules()
        .iter()
        .map(|r| r.pattern.to_string().len())
        .max()
        .unwrap_or(0);
    for (i, rule) in rules.rules().iter().enumerate() {
        println!(
            "{:>3}  {:<width$}  {:<18}  {}",
            i,
            rule.pattern.to_string(),
            rule.action.label(),
            rule.destination,
            width = width
        );
    }
}
