//! Render context - everything a template sees for one table

use serde::Serialize;
use tracing::debug;

use super::naming::{to_accessor_suffix, to_humped_table_name, to_property_name};
use super::type_mapper::map_type;
use crate::schema::{ColumnInfo, KeyKind, TableInfo};

/// Package names copied into every render context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageNames {
    pub package_path: String,
    pub entity_package: String,
    pub query_package: String,
    pub query_root_package: String,
    pub mapper_package: String,
}

/// One column as exposed to templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldContext {
    /// Raw column name
    pub field: String,
    pub data_type: String,
    /// Raw index flag ("PRI", "UNI", "MUL" or "")
    pub index: &'static str,
    pub comment: String,
    pub is_pk: bool,
    pub is_index: bool,
    /// camelCase name
    pub property: String,
    /// PascalCase name, used as accessor suffix
    pub property_n: String,
    /// JDBC type code, empty when the data type is unmapped
    pub jdbc_type: &'static str,
    pub java_type: &'static str,
}

impl FieldContext {
    fn from_column(column: ColumnInfo) -> Self {
        let mapped = map_type(&column.data_type);
        Self {
            property: to_property_name(&column.name),
            property_n: to_accessor_suffix(&column.name),
            index: column.key.as_flag(),
            is_pk: column.key.is_primary(),
            is_index: column.key.is_indexed(),
            jdbc_type: mapped.jdbc_type,
            java_type: mapped.java_type.as_str(),
            field: column.name,
            data_type: column.data_type,
            comment: column.comment,
        }
    }
}

/// The data a template is rendered against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    /// Primary key column name; empty when the table has none
    pub pk: String,
    /// Primary key property name (camelCase)
    pub pk_hump: String,
    /// Primary key Java type; empty when the table has none
    pub pk_type: String,
    pub table_note: String,
    pub table_name: String,
    pub table_name_hump: String,
    #[serde(flatten)]
    pub packages: PackageNames,
    pub fields: Vec<FieldContext>,
}

impl RenderContext {
    /// Context for a run-level artifact that does not belong to a table
    pub fn standalone(humped_name: &str, packages: &PackageNames) -> Self {
        Self {
            table_name_hump: humped_name.to_string(),
            packages: packages.clone(),
            ..Default::default()
        }
    }

    pub fn has_primary_key(&self) -> bool {
        !self.pk.is_empty()
    }
}

/// Build the render context for one table.
///
/// Column order is preserved. Composite primary keys are not supported:
/// every `PRI` column overwrites the key fields, so the last one scanned wins.
pub fn build_context<S: AsRef<str>>(
    table: &TableInfo,
    columns: Vec<ColumnInfo>,
    prefixes: &[S],
    packages: &PackageNames,
) -> RenderContext {
    let mut ctx = RenderContext {
        table_note: table.comment.clone(),
        table_name: table.name.clone(),
        table_name_hump: to_humped_table_name(&table.name, prefixes),
        packages: packages.clone(),
        fields: Vec::with_capacity(columns.len()),
        ..Default::default()
    };

    for column in columns {
        let field = FieldContext::from_column(column);
        if field.is_pk {
            ctx.pk = field.field.clone();
            ctx.pk_hump = field.property.clone();
            ctx.pk_type = field.java_type.to_string();
        }
        ctx.fields.push(field);
    }

    debug!(
        "Built context for {} -> {} ({} fields, pk: {:?})",
        ctx.table_name,
        ctx.table_name_hump,
        ctx.fields.len(),
        ctx.pk
    );
    ctx
}

/// Number of columns flagged as primary key
pub fn primary_key_count(columns: &[ColumnInfo]) -> usize {
    columns
        .iter()
        .filter(|c| c.key == KeyKind::Primary)
        .count()
}
