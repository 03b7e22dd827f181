//! MySQL schema introspection

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{OptsBuilder, Pool};
use tracing::debug;

use super::metadata::{ColumnInfo, TableInfo};
use crate::error::{CodegenError, Result};

/// Database that holds the metadata tables
pub const METADATA_DATABASE: &str = "information_schema";

const COLUMNS_QUERY: &str = "SELECT COLUMN_NAME, DATA_TYPE, COLUMN_KEY, COLUMN_COMMENT \
     FROM COLUMNS WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION";

/// Source of table and column metadata.
///
/// The generator only talks to the database through this trait, so tests
/// can substitute an in-memory schema.
#[async_trait]
pub trait SchemaSource: Send {
    /// List tables of `schema`, restricted to `filter` when it is non-empty
    async fn list_tables(&self, schema: &str, filter: &[String]) -> Result<Vec<TableInfo>>;

    /// List the columns of one table in declared order
    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Release the underlying database handle. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Connection parameters for the metadata database
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Build the table listing query with one placeholder per filtered name
pub fn tables_query(filter_len: usize) -> String {
    let mut sql =
        String::from("SELECT TABLE_NAME, TABLE_COMMENT FROM TABLES WHERE TABLE_SCHEMA = ?");
    if filter_len > 0 {
        let placeholders = vec!["?"; filter_len].join(", ");
        sql.push_str(&format!(" AND TABLE_NAME IN ({})", placeholders));
    }
    sql
}

/// Positional parameters matching [`tables_query`]
pub fn tables_params(schema: &str, filter: &[String]) -> Vec<String> {
    std::iter::once(schema.to_string())
        .chain(filter.iter().cloned())
        .collect()
}

/// Introspects a live MySQL server through `information_schema`.
pub struct MySqlIntrospector {
    pool: Option<Pool>,
}

impl MySqlIntrospector {
    /// Open a pool and check that the server is reachable.
    pub async fn connect(params: &ConnectParams) -> Result<Self> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(params.host.clone())
            .tcp_port(params.port)
            .user(Some(params.user.clone()))
            .pass(Some(params.password.clone()))
            .db_name(Some(METADATA_DATABASE));

        let pool = Pool::new(opts);
        let mut introspector = Self { pool: Some(pool) };

        if let Err(e) = introspector.ping().await {
            introspector.close().await.ok();
            return Err(e);
        }
        debug!(
            "Connected to {}@{}:{}",
            params.user, params.host, params.port
        );
        Ok(introspector)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.ping()
            .await
            .map_err(|e| CodegenError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn conn(&self) -> Result<mysql_async::Conn> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| CodegenError::Connection("connection already closed".into()))?;
        pool.get_conn()
            .await
            .map_err(|e| CodegenError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SchemaSource for MySqlIntrospector {
    async fn list_tables(&self, schema: &str, filter: &[String]) -> Result<Vec<TableInfo>> {
        let sql = tables_query(filter.len());
        debug!("Listing tables of {} (filter: {:?})", schema, filter);

        let mut conn = self.conn().await?;
        let rows: Vec<(String, Option<String>)> =
            conn.exec(sql, tables_params(schema, filter)).await?;

        Ok(rows
            .into_iter()
            .map(|(name, comment)| TableInfo {
                name,
                comment: comment.unwrap_or_default(),
            })
            .collect())
    }

    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut conn = self.conn().await?;
        let rows: Vec<(String, String, String, Option<String>)> = conn
            .exec(COLUMNS_QUERY, (schema.to_string(), table.to_string()))
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, key, comment)| {
                ColumnInfo::from_row(name, data_type, &key, comment.unwrap_or_default())
            })
            .collect())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            debug!("Disconnecting database pool");
            pool.disconnect()
                .await
                .map_err(|e| CodegenError::Connection(e.to_string()))?;
        }
        Ok(())
    }
}
