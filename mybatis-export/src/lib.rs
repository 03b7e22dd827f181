//! mybatis-export: Generate MyBatis Java sources from a live MySQL schema
//!
//! This crate provides both a CLI tool and a library. It reads table and
//! column metadata from MySQL's `information_schema` and renders, per table:
//!
//! - an entity class with one field per column
//! - a query object with one filter field per indexed column
//! - a mapper interface with the CRUD methods
//! - a mapper XML descriptor with the SQL statements
//!
//! Every artifact comes from a replaceable minijinja template.
//!
//! # CLI Usage
//!
//! ```bash
//! mybatis-export -u root --root-path ./out --package com.example shop bt_order
//! ```
//!
//! # Programmatic Usage
//!
//! ```rust,ignore
//! let config = mybatis_export::ExportBuilder::new("shop")
//!     .root_path("./out")
//!     .root_package("com.example")
//!     .tables(&["bt_order"])
//!     .overwrite()
//!     .build();
//! let report = mybatis_export::run(&config, &mut prompter).await?;
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod interact;
pub mod schema;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub use self::codegen::{exit_code, Generator, Report, TableSchema, TemplateSet};
pub use self::config::ExportConfig;
pub use self::error::{CodegenError, Result};

use interact::Prompter;
use schema::{MySqlIntrospector, SchemaSource};

/// Main entry point: connect to MySQL and generate every selected table
pub async fn run(config: &ExportConfig, prompter: &mut dyn Prompter) -> Result<Report> {
    config.validate()?;
    let templates = TemplateSet::load(config);

    info!(
        "Connecting to {}@{}:{}",
        config.user, config.host, config.port
    );
    let source = MySqlIntrospector::connect(&config.connect_params()).await?;
    generate_with(config, source, templates, prompter).await
}

/// Generate from an already opened schema source.
///
/// The source is closed before returning, whatever the outcome.
pub async fn generate_with<S: SchemaSource>(
    config: &ExportConfig,
    source: S,
    templates: TemplateSet,
    prompter: &mut dyn Prompter,
) -> Result<Report> {
    let mut generator = Generator::new(config, source, templates);
    let result = generator.run(prompter).await;
    if let Err(e) = generator.cleanup().await {
        warn!("Failed to close database connection: {}", e);
    }
    result
}

/// Connect to MySQL and list the selected tables with their columns
pub async fn inspect(config: &ExportConfig) -> Result<Vec<TableSchema>> {
    config.validate()?;
    let mut source = MySqlIntrospector::connect(&config.connect_params()).await?;
    let result = codegen::inspect_schema(&source, config).await;
    if let Err(e) = source.close().await {
        warn!("Failed to close database connection: {}", e);
    }
    result
}

/// Builder pattern for programmatic configuration
pub struct ExportBuilder {
    config: ExportConfig,
}

impl ExportBuilder {
    /// Create a new builder for the given database schema
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            config: ExportConfig {
                database: database.into(),
                password: Some(String::new()),
                table_prefix: Some(Vec::new()),
                ..Default::default()
            },
        }
    }

    /// Set the export root directory
    pub fn root_path(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.root_path = dir.as_ref().to_path_buf();
        self
    }

    /// Set the Java root package
    pub fn root_package(mut self, package: &str) -> Self {
        self.config.root_package = package.to_string();
        self
    }

    /// Set the entity, mapper and query packages, relative to the root package
    pub fn packages(mut self, entity: &str, mapper: &str, query: &str) -> Self {
        self.config.entity_package = entity.to_string();
        self.config.mapper_package = mapper.to_string();
        self.config.query_package = query.to_string();
        self
    }

    /// Set the mapper XML directory, relative to the root path
    pub fn mapper_xml_path(mut self, path: &str) -> Self {
        self.config.mapper_xml_path = path.to_string();
        self
    }

    /// Set the tables to process
    pub fn tables(mut self, tables: &[&str]) -> Self {
        self.config.tables = tables.iter().map(|t| t.to_string()).collect();
        self.config.all_tables = false;
        self
    }

    /// Process every table of the schema
    pub fn all_tables(mut self) -> Self {
        self.config.tables.clear();
        self.config.all_tables = true;
        self
    }

    /// Set the prefixes stripped from table names
    pub fn table_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.config.table_prefix = Some(prefixes.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Set the database connection
    pub fn connection(mut self, host: &str, port: u16, user: &str, password: &str) -> Self {
        self.config.host = host.to_string();
        self.config.port = port;
        self.config.user = user.to_string();
        self.config.password = Some(password.to_string());
        self
    }

    /// Override the template of one artifact
    pub fn template(mut self, role: codegen::ArtifactRole, path: impl Into<PathBuf>) -> Self {
        let path = Some(path.into());
        match role {
            codegen::ArtifactRole::Entity => self.config.entity_template = path,
            codegen::ArtifactRole::Query => self.config.query_template = path,
            codegen::ArtifactRole::Mapper => self.config.mapper_template = path,
            codegen::ArtifactRole::MapperXml => self.config.mapper_xml_template = path,
            codegen::ArtifactRole::BaseQuery => {
                warn!("The base query template cannot be overridden");
            }
        }
        self
    }

    /// Overwrite existing files without asking
    pub fn overwrite(mut self) -> Self {
        self.config.overwrite = true;
        self
    }

    /// Also generate the abstract base query class
    pub fn base_query(mut self) -> Self {
        self.config.base_query = true;
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    /// Finish the configuration, filling unset values with defaults
    pub fn build(mut self) -> ExportConfig {
        self.config.apply_defaults();
        self.config.normalize();
        self.config
    }
}
