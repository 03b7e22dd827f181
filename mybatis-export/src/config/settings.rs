//! Configuration settings for mybatis-export

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::defaults;
use crate::codegen::PackageNames;
use crate::error::{CodegenError, Result};
use crate::interact::{MissingParam, Prompter};
use crate::schema::ConnectParams;

/// Main configuration struct for a generation run.
///
/// Empty strings (and a zero port) mean "not provided"; such values are
/// asked for by [`ExportConfig::complete_with`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExportConfig {
    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Database user
    pub user: String,

    /// Database password; `None` until provided or asked for
    pub password: Option<String>,

    /// Schema to introspect
    pub database: String,

    /// Tables to process; empty means "ask" unless `all_tables` is set
    pub tables: Vec<String>,

    /// Prefixes stripped from table names, first match wins
    #[serde(alias = "table_prefix")]
    pub table_prefix: Option<Vec<String>>,

    /// Export root directory
    #[serde(alias = "root_path")]
    pub root_path: PathBuf,

    /// Java root package (e.g. "com.example")
    #[serde(alias = "root_package")]
    pub root_package: String,

    /// Entity package, not including the root package
    #[serde(alias = "entity_package")]
    pub entity_package: String,

    /// Mapper interface package, not including the root package
    #[serde(alias = "mapper_package")]
    pub mapper_package: String,

    /// Mapper XML directory, not including the root path
    #[serde(alias = "mapper_xml_path")]
    pub mapper_xml_path: String,

    /// Query package, not including the root package
    #[serde(alias = "query_package")]
    pub query_package: String,

    /// Override template for entities
    #[serde(alias = "entity_template")]
    pub entity_template: Option<PathBuf>,

    /// Override template for mapper interfaces
    #[serde(alias = "mapper_template")]
    pub mapper_template: Option<PathBuf>,

    /// Override template for mapper XML descriptors
    #[serde(alias = "mapper_xml_template")]
    pub mapper_xml_template: Option<PathBuf>,

    /// Override template for query objects
    #[serde(alias = "query_template")]
    pub query_template: Option<PathBuf>,

    /// Overwrite existing files without asking
    pub overwrite: bool,

    /// Process every table of the schema
    #[serde(alias = "all_tables")]
    pub all_tables: bool,

    /// Also generate the abstract base query class
    #[serde(alias = "base_query")]
    pub base_query: bool,

    /// Dry run mode - report paths without writing files
    #[serde(alias = "dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(alias = "log_level")]
    pub log_level: Option<String>,
}

impl ExportConfig {
    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// Load with `env` standing in for the process environment when given
    fn load_with_env(
        config_path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from config file if specified
        if let Some(path) = config_path {
            if !path.is_file() {
                return Err(CodegenError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        } else {
            // Try default locations
            builder = builder.add_source(File::with_name("mybatis-export").required(false));
        }

        // Override with environment variables (MYBATIS_EXPORT_*)
        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tables")
                .with_list_parse_key("table_prefix")
                .source(env),
        );

        let mut config: ExportConfig = builder.build()?.try_deserialize()?;

        if let Some(base) = config_path.and_then(Path::parent) {
            config.resolve_relative_to(base);
        }
        config.normalize();

        debug!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    /// Resolve relative template paths and root path against a config file's directory
    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() && !path.as_os_str().is_empty() {
                *path = base.join(&*path);
            }
        };

        resolve(&mut self.root_path);
        for template in [
            &mut self.entity_template,
            &mut self.mapper_template,
            &mut self.mapper_xml_template,
            &mut self.query_template,
        ]
        .into_iter()
        .flatten()
        {
            resolve(template);
        }
    }

    /// Trim quoting from table names and drop empty list entries
    pub fn normalize(&mut self) {
        self.database = trim_quoted(&self.database).to_string();
        self.tables = self
            .tables
            .iter()
            .map(|t| trim_quoted(t).to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if let Some(prefixes) = &mut self.table_prefix {
            prefixes.retain(|p| !p.is_empty());
        }
    }

    /// Set table prefixes from a comma-separated list
    pub fn set_table_prefixes(&mut self, list: &str) {
        self.table_prefix = Some(split_list(trim_quoted(list), ','));
    }

    /// Ask the operator for every missing setting
    pub fn complete_with(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        if self.host.is_empty() {
            self.host = prompter.ask_missing_param(MissingParam::Host)?;
        }
        if self.port == 0 {
            let answer = prompter.ask_missing_param(MissingParam::Port)?;
            self.port = parse_port(&answer)?;
        }
        if self.user.is_empty() {
            self.user = prompter.ask_missing_param(MissingParam::User)?;
        }
        if self.password.is_none() {
            self.password = Some(prompter.ask_missing_param(MissingParam::Password)?);
        }
        if self.root_package.is_empty() {
            self.root_package = prompter.ask_missing_param(MissingParam::RootPackage)?;
        }
        if self.entity_package.is_empty() {
            self.entity_package = prompter.ask_missing_param(MissingParam::EntityPackage)?;
        }
        if self.mapper_package.is_empty() {
            self.mapper_package = prompter.ask_missing_param(MissingParam::MapperPackage)?;
        }
        if self.mapper_xml_path.is_empty() {
            self.mapper_xml_path = prompter.ask_missing_param(MissingParam::MapperXmlPath)?;
        }
        if self.query_package.is_empty() {
            self.query_package = prompter.ask_missing_param(MissingParam::QueryPackage)?;
        }
        if self.root_path.as_os_str().is_empty() {
            let answer = prompter.ask_missing_param(MissingParam::ExportPath)?;
            self.root_path = PathBuf::from(answer.trim());
        }
        self.root_path = absolute_root(&self.root_path)?;
        if self.database.is_empty() {
            self.database = prompter.ask_missing_param(MissingParam::Database)?;
        }
        if self.table_prefix.is_none() {
            let answer = prompter.ask_missing_param(MissingParam::TablePrefixes)?;
            self.set_table_prefixes(&answer);
        }

        if self.all_tables {
            self.tables.clear();
        } else if self.tables.is_empty() && !prompter.confirm_all_tables()? {
            let answer = prompter.ask_missing_param(MissingParam::Tables)?;
            self.tables = answer.split_whitespace().map(str::to_string).collect();
        }

        self.normalize();
        Ok(())
    }

    /// Fill unset values with their defaults instead of asking
    pub fn apply_defaults(&mut self) {
        if self.host.is_empty() {
            self.host = defaults::HOST.to_string();
        }
        if self.port == 0 {
            self.port = defaults::PORT;
        }
        if self.user.is_empty() {
            self.user = defaults::USER.to_string();
        }
        if self.entity_package.is_empty() {
            self.entity_package = defaults::ENTITY_PACKAGE.to_string();
        }
        if self.mapper_package.is_empty() {
            self.mapper_package = defaults::MAPPER_PACKAGE.to_string();
        }
        if self.mapper_xml_path.is_empty() {
            self.mapper_xml_path = defaults::MAPPER_XML_PATH.to_string();
        }
        if self.query_package.is_empty() {
            self.query_package = defaults::QUERY_PACKAGE.to_string();
        }
    }

    /// The query package with its last segment removed
    /// e.g., "model.query" -> "model", "query" -> "query"
    pub fn query_root_package(&self) -> &str {
        match self.query_package.rfind('.') {
            Some(idx) => &self.query_package[..idx],
            None => &self.query_package,
        }
    }

    /// Table prefixes, empty when none were configured
    pub fn prefixes(&self) -> &[String] {
        self.table_prefix.as_deref().unwrap_or_default()
    }

    /// Package names handed to every render context
    pub fn packages(&self) -> PackageNames {
        PackageNames {
            package_path: self.root_package.clone(),
            entity_package: self.entity_package.clone(),
            query_package: self.query_package.clone(),
            query_root_package: self.query_root_package().to_string(),
            mapper_package: self.mapper_package.clone(),
        }
    }

    /// Connection parameters for the metadata database
    pub fn connect_params(&self) -> ConnectParams {
        ConnectParams {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone().unwrap_or_default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(CodegenError::Validation("database is required".into()));
        }
        if self.port == 0 {
            return Err(CodegenError::Validation("port must be in 1..=65535".into()));
        }
        if self.host.is_empty() {
            return Err(CodegenError::Validation("host is required".into()));
        }
        if self.root_path.as_os_str().is_empty() {
            return Err(CodegenError::Validation("root-path is required".into()));
        }
        if self.root_path.is_file() {
            return Err(CodegenError::Validation(format!(
                "root-path is not a directory: {}",
                self.root_path.display()
            )));
        }
        Ok(())
    }
}

/// Trim surrounding quotes and whitespace
pub fn trim_quoted(value: &str) -> &str {
    value.trim_matches(|c: char| matches!(c, '"' | '\'' | ' ' | '\t' | '\n'))
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_port(answer: &str) -> Result<u16> {
    match answer.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(CodegenError::Validation(format!(
            "Invalid port: {:?}",
            answer
        ))),
    }
}

fn absolute_root(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Ok(std::env::current_dir()?);
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::OverwriteDecision;
    use std::collections::VecDeque;

    /// Prompter that answers from a queue and records what was asked
    #[derive(Default)]
    struct QueuePrompter {
        answers: VecDeque<String>,
        all_tables: bool,
        asked: Vec<MissingParam>,
    }

    impl Prompter for QueuePrompter {
        fn confirm_overwrite(&mut self, _path: &Path) -> Result<OverwriteDecision> {
            Ok(OverwriteDecision::Skip)
        }

        fn ask_missing_param(&mut self, param: MissingParam) -> Result<String> {
            self.asked.push(param);
            Ok(self.answers.pop_front().unwrap_or_default())
        }

        fn confirm_all_tables(&mut self) -> Result<bool> {
            Ok(self.all_tables)
        }
    }

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert!(config.host.is_empty());
        assert_eq!(config.port, 0);
        assert!(config.table_prefix.is_none());
        assert!(!config.overwrite);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_yaml_keys() {
        let yaml = r#"
host: db.local
port: 3307
user: admin
password: secret
database: shop
tables:
  - bt_order
  - bt_user
table-prefix:
  - bt_
root-path: /tmp/out
root-package: com.example
entity-package: entity
mapper-package: mapper
mapper-xml-path: mapper
query-package: model.query
log-level: debug
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();

        let config = ExportConfig::load(Some(&path)).unwrap();
        assert_eq!(config.host, "db.local");
        assert_eq!(config.port, 3307);
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.tables, vec!["bt_order", "bt_user"]);
        assert_eq!(config.prefixes(), ["bt_".to_string()]);
        assert_eq!(config.root_path, PathBuf::from("/tmp/out"));
        assert_eq!(config.query_root_package(), "model");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "root-path: out\nentity-template: template/entity.j2\ndatabase: shop\n",
        )
        .unwrap();

        let config = ExportConfig::load(Some(&path)).unwrap();
        assert_eq!(config.root_path, dir.path().join("out"));
        assert_eq!(
            config.entity_template,
            Some(dir.path().join("template/entity.j2"))
        );
        assert!(config.mapper_template.is_none());
    }

    fn env_vars(vars: &[(&str, &str)]) -> config::Map<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_variables() {
        let env = env_vars(&[
            ("MYBATIS_EXPORT_TABLE_PREFIX", "bt_,sys_"),
            ("MYBATIS_EXPORT_TABLES", "bt_order,bt_user"),
            ("MYBATIS_EXPORT_ROOT_PATH", "/srv/export"),
            ("MYBATIS_EXPORT_PORT", "3310"),
            ("MYBATIS_EXPORT_PASSWORD", "secret"),
            ("MYBATIS_EXPORT_DATABASE", "shop"),
            ("OTHER_PORT", "1"),
        ]);
        let config = ExportConfig::load_with_env(None, Some(env)).unwrap();

        assert_eq!(
            config.table_prefix,
            Some(vec!["bt_".to_string(), "sys_".to_string()])
        );
        assert_eq!(config.tables, vec!["bt_order", "bt_user"]);
        assert_eq!(config.root_path, PathBuf::from("/srv/export"));
        assert_eq!(config.port, 3310);
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.database, "shop");
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "host: db.local\nport: 3307\ndatabase: shop\n").unwrap();

        let env = env_vars(&[("MYBATIS_EXPORT_PORT", "3310")]);
        let config = ExportConfig::load_with_env(Some(&path), Some(env)).unwrap();
        assert_eq!(config.host, "db.local");
        assert_eq!(config.port, 3310);
    }

    #[test]
    fn test_missing_config_file() {
        let err = ExportConfig::load(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(matches!(err, CodegenError::Config(_)));
    }

    #[test]
    fn test_query_root_package() {
        let mut config = ExportConfig {
            query_package: "model.query".into(),
            ..Default::default()
        };
        assert_eq!(config.query_root_package(), "model");

        config.query_package = "query".into();
        assert_eq!(config.query_root_package(), "query");

        config.query_package = "a.b.c".into();
        assert_eq!(config.query_root_package(), "a.b");
    }

    #[test]
    fn test_normalize_trims_table_names() {
        let mut config = ExportConfig {
            database: "'shop'".into(),
            tables: vec!["\"bt_order\"".into(), " sys_log ".into(), "".into()],
            ..Default::default()
        };
        config.set_table_prefixes("\"bt_,,sys_\"");
        config.normalize();
        assert_eq!(config.database, "shop");
        assert_eq!(config.tables, vec!["bt_order", "sys_log"]);
        assert_eq!(config.prefixes(), ["bt_".to_string(), "sys_".to_string()]);
    }

    #[test]
    fn test_complete_with_asks_in_order() {
        let mut prompter = QueuePrompter {
            answers: [
                "localhost",
                "3306",
                "root",
                "",
                "com.example",
                "entity",
                "mapper",
                "mapper",
                "model.query",
                "/tmp/export",
                "shop",
                "bt_,sys_",
                "bt_order sys_log",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            all_tables: false,
            asked: Vec::new(),
        };

        let mut config = ExportConfig::default();
        config.complete_with(&mut prompter).unwrap();

        assert_eq!(
            prompter.asked,
            vec![
                MissingParam::Host,
                MissingParam::Port,
                MissingParam::User,
                MissingParam::Password,
                MissingParam::RootPackage,
                MissingParam::EntityPackage,
                MissingParam::MapperPackage,
                MissingParam::MapperXmlPath,
                MissingParam::QueryPackage,
                MissingParam::ExportPath,
                MissingParam::Database,
                MissingParam::TablePrefixes,
                MissingParam::Tables,
            ]
        );
        assert_eq!(config.port, 3306);
        assert_eq!(config.password.as_deref(), Some(""));
        assert_eq!(config.root_path, PathBuf::from("/tmp/export"));
        assert_eq!(config.tables, vec!["bt_order", "sys_log"]);
        assert_eq!(config.prefixes().len(), 2);
        config.validate().unwrap();
    }

    #[test]
    fn test_complete_with_all_tables_skips_question() {
        let mut prompter = QueuePrompter::default();
        let mut config = ExportConfig {
            database: "shop".into(),
            tables: vec!["bt_order".into()],
            table_prefix: Some(vec![]),
            root_path: PathBuf::from("/tmp/export"),
            password: Some(String::new()),
            all_tables: true,
            ..Default::default()
        };
        config.apply_defaults();
        config.root_package = "com.example".into();
        config.complete_with(&mut prompter).unwrap();

        assert!(prompter.asked.is_empty());
        assert!(config.tables.is_empty());
    }

    #[test]
    fn test_invalid_port_answer() {
        let mut prompter = QueuePrompter {
            answers: ["localhost", "70000"].into_iter().map(String::from).collect(),
            ..Default::default()
        };
        let mut config = ExportConfig::default();
        let err = config.complete_with(&mut prompter).unwrap_err();
        assert!(matches!(err, CodegenError::Validation(_)));
    }

    #[test]
    fn test_validation_missing_database() {
        let mut config = ExportConfig::default();
        config.apply_defaults();
        config.root_path = PathBuf::from("/tmp/export");
        assert!(config.validate().is_err());

        config.database = "shop".into();
        assert!(config.validate().is_ok());
    }
}
