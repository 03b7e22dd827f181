//! Operator interaction
//!
//! The generator never touches the terminal directly; it asks a
//! [`Prompter`]. [`TerminalPrompter`] is the interactive implementation,
//! tests and scripted runs supply their own.

use std::path::Path;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::config::defaults;
use crate::error::{CodegenError, Result};

/// Answer to "the file already exists, overwrite it?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteDecision {
    Overwrite,
    Skip,
    OverwriteAll,
    SkipAll,
}

impl OverwriteDecision {
    /// Choices in the order they are presented
    pub const CHOICES: [OverwriteDecision; 4] = [
        OverwriteDecision::Overwrite,
        OverwriteDecision::Skip,
        OverwriteDecision::OverwriteAll,
        OverwriteDecision::SkipAll,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OverwriteDecision::Overwrite => "overwrite",
            OverwriteDecision::Skip => "no",
            OverwriteDecision::OverwriteAll => "overwrite all",
            OverwriteDecision::SkipAll => "no all",
        }
    }
}

/// A setting that can be asked for when neither flags nor config provide it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingParam {
    Host,
    Port,
    User,
    Password,
    RootPackage,
    EntityPackage,
    MapperPackage,
    MapperXmlPath,
    QueryPackage,
    ExportPath,
    Database,
    TablePrefixes,
    Tables,
}

impl MissingParam {
    pub fn message(&self) -> &'static str {
        match self {
            MissingParam::Host => "Please provide the database address",
            MissingParam::Port => "Please provide the port of database",
            MissingParam::User => "Please provide the user of database",
            MissingParam::Password => "Please provide the password of database",
            MissingParam::RootPackage => {
                "Please provide the java root package, e.g. com.google, com.github.aaa"
            }
            MissingParam::EntityPackage => {
                "Please provide the entity package, not including the root package"
            }
            MissingParam::MapperPackage => {
                "Please provide the mapper package, not including the root package"
            }
            MissingParam::MapperXmlPath => {
                "Please provide the mapper xml path, not including the root path"
            }
            MissingParam::QueryPackage => {
                "Please provide the query package, not including the root package"
            }
            MissingParam::ExportPath => "Please provide the export directory path",
            MissingParam::Database => "Please provide the database name",
            MissingParam::TablePrefixes => {
                "Please provide table prefixes separated by \",\", e.g. table \"bt_order\" has prefix \"bt_\""
            }
            MissingParam::Tables => "Please provide table names separated by spaces",
        }
    }

    /// Default answer, if any
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            MissingParam::Host => Some(defaults::HOST),
            MissingParam::Port => Some(defaults::PORT_STR),
            MissingParam::User => Some(defaults::USER),
            MissingParam::EntityPackage => Some(defaults::ENTITY_PACKAGE),
            MissingParam::MapperPackage => Some(defaults::MAPPER_PACKAGE),
            MissingParam::MapperXmlPath => Some(defaults::MAPPER_XML_PATH),
            MissingParam::QueryPackage => Some(defaults::QUERY_PACKAGE),
            _ => None,
        }
    }

    /// Whether an empty answer is acceptable
    pub fn allows_empty(&self) -> bool {
        matches!(
            self,
            MissingParam::Password | MissingParam::TablePrefixes | MissingParam::ExportPath
        )
    }
}

/// Capability for everything the run needs to ask the operator
pub trait Prompter {
    /// Ask what to do with an existing output file
    fn confirm_overwrite(&mut self, path: &Path) -> Result<OverwriteDecision>;

    /// Ask for a missing setting
    fn ask_missing_param(&mut self, param: MissingParam) -> Result<String>;

    /// Ask whether every table of the schema should be processed
    fn confirm_all_tables(&mut self) -> Result<bool>;
}

/// Interactive prompter backed by `dialoguer`
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn prompt_error(err: dialoguer::Error) -> CodegenError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
            CodegenError::Interrupted
        }
        dialoguer::Error::IO(e) => CodegenError::Prompt(e.to_string()),
    }
}

impl Prompter for TerminalPrompter {
    fn confirm_overwrite(&mut self, path: &Path) -> Result<OverwriteDecision> {
        let labels: Vec<&str> = OverwriteDecision::CHOICES
            .iter()
            .map(|d| d.label())
            .collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt(format!(
                "The file \"{}\" already exists, whether to overwrite",
                path.display()
            ))
            .items(&labels)
            .default(1)
            .interact()
            .map_err(prompt_error)?;

        Ok(OverwriteDecision::CHOICES[selection])
    }

    fn ask_missing_param(&mut self, param: MissingParam) -> Result<String> {
        if param == MissingParam::Password {
            return Password::with_theme(&self.theme)
                .with_prompt(param.message())
                .allow_empty_password(true)
                .interact()
                .map_err(prompt_error);
        }

        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(param.message())
            .allow_empty(param.allows_empty());
        if let Some(default) = param.default_value() {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn confirm_all_tables(&mut self) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt("You did not provide a table name, process all tables in the database?")
            .default(true)
            .interact()
            .map_err(prompt_error)
    }
}
