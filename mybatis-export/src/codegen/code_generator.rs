//! Main code generator orchestrator

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use super::context::{build_context, primary_key_count, PackageNames, RenderContext};
use super::materializer::{ArtifactRole, ConflictPolicy, Materializer, Outcome};
use super::templates::TemplateSet;
use crate::config::ExportConfig;
use crate::error::{CodegenError, Result};
use crate::interact::Prompter;
use crate::schema::{ColumnInfo, SchemaSource, TableInfo};

/// Exit code when every artifact was written or deliberately skipped
pub const EXIT_OK: i32 = 0;
/// Exit code for run-fatal errors (connection, schema query, configuration)
pub const EXIT_FATAL: i32 = 1;
/// Exit code when the run finished but some artifacts failed
pub const EXIT_PARTIAL: i32 = 2;
/// Exit code when the operator aborted a prompt
pub const EXIT_INTERRUPTED: i32 = 130;

/// A single artifact that could not be generated
#[derive(Debug)]
pub struct ArtifactFailure {
    pub table: String,
    pub role: ArtifactRole,
    pub error: CodegenError,
}

/// Summary of one generation run
#[derive(Debug, Default)]
pub struct Report {
    pub tables: usize,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Paths that a dry run would have written
    pub planned: Vec<PathBuf>,
    pub failures: Vec<ArtifactFailure>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            EXIT_OK
        } else {
            EXIT_PARTIAL
        }
    }
}

/// Map a run result to a process exit code
pub fn exit_code(result: &Result<Report>) -> i32 {
    match result {
        Ok(report) => report.exit_code(),
        Err(CodegenError::Interrupted) => EXIT_INTERRUPTED,
        Err(_) => EXIT_FATAL,
    }
}

/// One table with its columns, as listed by [`inspect_schema`]
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table: TableInfo,
    pub columns: Vec<ColumnInfo>,
}

/// List the selected tables and their columns without generating anything
pub async fn inspect_schema<S: SchemaSource + ?Sized>(
    source: &S,
    config: &ExportConfig,
) -> Result<Vec<TableSchema>> {
    let tables = source.list_tables(&config.database, &config.tables).await?;
    let mut out = Vec::with_capacity(tables.len());
    for table in tables {
        let columns = source.list_columns(&config.database, &table.name).await?;
        out.push(TableSchema { table, columns });
    }
    Ok(out)
}

/// Run context: owns the schema source and the conflict policy for one run
pub struct Generator<'a, S: SchemaSource> {
    config: &'a ExportConfig,
    source: S,
    templates: TemplateSet,
    materializer: Materializer,
    packages: PackageNames,
    policy: ConflictPolicy,
}

impl<'a, S: SchemaSource> Generator<'a, S> {
    /// Create a generator; the conflict policy starts as `OverwriteAll` when
    /// `config.overwrite` is set
    pub fn new(config: &'a ExportConfig, source: S, templates: TemplateSet) -> Self {
        Self {
            config,
            source,
            templates,
            materializer: Materializer::new(&config.root_path),
            packages: config.packages(),
            policy: ConflictPolicy::new(config.overwrite),
        }
    }

    /// Generate every artifact of every selected table.
    ///
    /// Table and column listing failures abort the run; per-artifact
    /// failures are recorded in the report and the run continues.
    pub async fn run(&mut self, prompter: &mut dyn Prompter) -> Result<Report> {
        let config = self.config;
        let mut report = Report::default();

        info!("Listing tables of {}", config.database);
        let tables = self
            .source
            .list_tables(&config.database, &config.tables)
            .await?;
        info!("Found {} tables", tables.len());
        if tables.is_empty() {
            warn!("No tables selected in {}", config.database);
        }

        if config.base_query {
            let ctx = RenderContext::standalone("Query", &self.packages);
            self.generate_artifact(ArtifactRole::BaseQuery, &ctx, &mut report, prompter)?;
        }

        for table in &tables {
            let columns = self
                .source
                .list_columns(&config.database, &table.name)
                .await?;
            debug!("Table {}: {} columns", table.name, columns.len());
            if primary_key_count(&columns) > 1 {
                warn!(
                    "Table {} has a composite primary key; only the last key column is used",
                    table.name
                );
            }

            let ctx = build_context(table, columns, config.prefixes(), &self.packages);
            for role in ArtifactRole::TABLE_ARTIFACTS {
                self.generate_artifact(role, &ctx, &mut report, prompter)?;
            }
            report.tables += 1;
        }

        info!(
            "Generated {} files, skipped {}, failed {}",
            report.written.len(),
            report.skipped.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Materialize one artifact, recording its outcome.
    ///
    /// Only run-fatal errors (e.g. an interrupted prompt) are returned.
    fn generate_artifact(
        &mut self,
        role: ArtifactRole,
        ctx: &RenderContext,
        report: &mut Report,
        prompter: &mut dyn Prompter,
    ) -> Result<()> {
        let package = role.package(self.config);

        if self.config.dry_run {
            let path = self
                .materializer
                .target_path(role, package, &ctx.table_name_hump);
            debug!("Would generate {} {}", role, path.display());
            report.planned.push(path);
            return Ok(());
        }

        let result = self.materializer.materialize(
            role,
            self.templates.get(role),
            package,
            ctx,
            &mut self.policy,
            prompter,
        );

        match result {
            Ok(Outcome::Written(path)) => {
                info!("Generate {} [{}] success", role, path.display());
                report.written.push(path);
            }
            Ok(Outcome::Skipped(path)) => {
                info!("Skip {} [{}], file exists", role, path.display());
                report.skipped.push(path);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!(
                    "Generate {} for table {} failed: {}",
                    role, ctx.table_name, e
                );
                report.failures.push(ArtifactFailure {
                    table: ctx.table_name.clone(),
                    role,
                    error: e,
                });
            }
        }
        Ok(())
    }

    /// Release the database handle. Safe to call more than once.
    pub async fn cleanup(&mut self) -> Result<()> {
        self.source.close().await
    }
}
