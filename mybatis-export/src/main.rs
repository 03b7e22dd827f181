//! CLI entry point for mybatis-export

use anyhow::Result;
use clap::{ArgAction, Parser};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mybatis_export::codegen::{map_type, write_scaffold, EXIT_FATAL, EXIT_INTERRUPTED, EXIT_OK};
use mybatis_export::config::{trim_quoted, ExportConfig};
use mybatis_export::interact::TerminalPrompter;
use mybatis_export::{CodegenError, Report};

#[derive(Parser)]
#[command(name = "mybatis-export")]
#[command(about = "Generate MyBatis entities, queries, mappers and mapper XML from a MySQL schema")]
#[command(version)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Path to configuration file (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database host
    #[arg(short = 'h', long)]
    host: Option<String>,

    /// Database port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Database user
    #[arg(short, long)]
    user: Option<String>,

    /// Database password
    #[arg(short, long)]
    password: Option<String>,

    /// Entity package, relative to the root package
    #[arg(short, long)]
    entity_package: Option<String>,

    /// Mapper package, relative to the root package
    #[arg(short, long)]
    mapper_package: Option<String>,

    /// Mapper XML directory, relative to the root path
    #[arg(short = 'M', long)]
    mapper_path: Option<String>,

    /// Query package, relative to the root package
    #[arg(short, long)]
    query_package: Option<String>,

    /// Export root directory
    #[arg(long)]
    root_path: Option<PathBuf>,

    /// Java root package
    #[arg(long)]
    package: Option<String>,

    /// Table name prefixes to strip (comma-separated)
    #[arg(long)]
    table_prefix: Option<String>,

    /// Overwrite existing files without asking
    #[arg(short, long)]
    overwrite: bool,

    /// Process every table of the database
    #[arg(short = 'a', long)]
    all_table: bool,

    /// Write the default templates and a sample config into DIR, then exit
    #[arg(short = 'g', long, value_name = "DIR")]
    generate_template: Option<PathBuf>,

    /// Also generate the abstract base Query class
    #[arg(long)]
    base_query: bool,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    /// Inspect schema (list tables and columns without generating)
    #[arg(long)]
    inspect: bool,

    /// Database schema to export
    database: Option<String>,

    /// Tables to export
    tables: Vec<String>,
}

fn main() {
    let code = match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            match e.downcast_ref::<CodegenError>() {
                Some(CodegenError::Interrupted) => EXIT_INTERRUPTED,
                _ => EXIT_FATAL,
            }
        }
    };
    std::process::exit(code);
}

fn try_main() -> Result<i32> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = ExportConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    if let Some(dir) = &cli.generate_template {
        return generate_template(dir);
    }

    apply_cli_overrides(&mut config, &cli);

    let mut prompter = TerminalPrompter::new();
    config.complete_with(&mut prompter)?;
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if cli.inspect {
        let tables = runtime.block_on(mybatis_export::inspect(&config))?;
        print_inspection(&tables);
        return Ok(EXIT_OK);
    }

    info!("Exporting {} into {:?}", config.database, config.root_path);
    let result = runtime.block_on(mybatis_export::run(&config, &mut prompter));
    let code = mybatis_export::exit_code(&result);
    match result {
        Ok(report) => print_report(&report, config.dry_run),
        Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
    }
    Ok(code)
}

/// Command-line values win over file and environment values
fn apply_cli_overrides(config: &mut ExportConfig, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(user) = &cli.user {
        config.user = user.clone();
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    if let Some(package) = &cli.entity_package {
        config.entity_package = package.clone();
    }
    if let Some(package) = &cli.mapper_package {
        config.mapper_package = package.clone();
    }
    if let Some(path) = &cli.mapper_path {
        config.mapper_xml_path = path.clone();
    }
    if let Some(package) = &cli.query_package {
        config.query_package = package.clone();
    }
    if let Some(root) = &cli.root_path {
        config.root_path = root.clone();
    }
    if let Some(package) = &cli.package {
        config.root_package = package.clone();
    }
    if let Some(prefixes) = &cli.table_prefix {
        config.set_table_prefixes(prefixes);
    }
    if let Some(database) = &cli.database {
        config.database = trim_quoted(database).to_string();
    }
    if !cli.tables.is_empty() {
        config.tables = cli.tables.clone();
    }
    config.overwrite |= cli.overwrite;
    config.all_tables |= cli.all_table;
    config.base_query |= cli.base_query;
    config.dry_run |= cli.dry_run;
    config.normalize();
}

fn generate_template(dir: &Path) -> Result<i32> {
    let config_path = write_scaffold(dir)?;
    println!(
        "{} templates written to {}",
        "Success".green(),
        dir.join("template").display()
    );
    println!("Sample configuration: {}", config_path.display());
    Ok(EXIT_OK)
}

fn print_inspection(tables: &[mybatis_export::TableSchema]) {
    println!("Found {} tables:\n", tables.len());
    for schema in tables {
        if schema.table.comment.is_empty() {
            println!("Table: {}", schema.table.name.bold());
        } else {
            println!("Table: {} ({})", schema.table.name.bold(), schema.table.comment);
        }
        println!("  Columns:");
        for col in &schema.columns {
            let mapped = map_type(&col.data_type);
            let key = col.key.as_flag();
            let key = if key.is_empty() {
                String::new()
            } else {
                format!(" {}", key)
            };
            println!(
                "    - {} {}{} -> {} {}",
                col.name, col.data_type, key, mapped.java_type, mapped.jdbc_type
            );
        }
        println!();
    }
}

fn print_report(report: &Report, dry_run: bool) {
    if dry_run {
        println!("Dry run mode - would generate:");
        for path in &report.planned {
            println!("  {}", path.display());
        }
        return;
    }

    for path in &report.written {
        println!("{} {}", "Generated".green(), path.display());
    }
    for path in &report.skipped {
        println!("{} {}", "Skipped".yellow(), path.display());
    }
    for failure in &report.failures {
        println!(
            "{} {} of {}: {}",
            "Failed".red(),
            failure.role,
            failure.table,
            failure.error
        );
    }
    println!(
        "{} tables: {} written, {} skipped, {} failed",
        report.tables,
        report.written.len().to_string().green(),
        report.skipped.len().to_string().yellow(),
        report.failures.len().to_string().red()
    );
}
