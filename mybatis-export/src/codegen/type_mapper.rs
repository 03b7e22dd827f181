//! MySQL to Java/JDBC type mapping

/// Represents a Java type for code generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavaType {
    Integer,
    Long,
    Float,
    Double,
    BigDecimal,
    String,
    Timestamp,
    Time,
    Date,
    ByteArray,
    Byte,
    /// Fallback for types without a mapping
    Object,
}

impl JavaType {
    /// Get the type string as it appears in generated code
    pub fn as_str(&self) -> &'static str {
        match self {
            JavaType::Integer => "Integer",
            JavaType::Long => "Long",
            JavaType::Float => "Float",
            JavaType::Double => "Double",
            JavaType::BigDecimal => "java.math.BigDecimal",
            JavaType::String => "String",
            JavaType::Timestamp => "java.sql.Timestamp",
            JavaType::Time => "java.sql.Time",
            JavaType::Date => "java.sql.Date",
            JavaType::ByteArray => "Byte[]",
            JavaType::Byte => "Byte",
            JavaType::Object => "Object",
        }
    }
}

impl std::fmt::Display for JavaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of mapping one database type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedType {
    pub java_type: JavaType,
    /// JDBC type code used by the mapping descriptor; empty when unmapped
    pub jdbc_type: &'static str,
}

impl MappedType {
    const fn new(java_type: JavaType, jdbc_type: &'static str) -> Self {
        Self {
            java_type,
            jdbc_type,
        }
    }

    pub fn is_mapped(&self) -> bool {
        !self.jdbc_type.is_empty()
    }
}

/// Map a MySQL `DATA_TYPE` value to its Java type and JDBC type code.
///
/// Lookup is case-sensitive: only the all-lowercase and all-uppercase
/// spellings are known. Anything else maps to `Object` with an empty tag.
pub fn map_type(data_type: &str) -> MappedType {
    match data_type {
        "int" | "integer" | "INT" | "INTEGER" => MappedType::new(JavaType::Integer, "INTEGER"),
        "mediumint" | "MEDIUMINT" => MappedType::new(JavaType::Integer, "INTEGER"),
        "tinyint" | "TINYINT" => MappedType::new(JavaType::Integer, "TINYINT"),
        "smallint" | "SMALLINT" => MappedType::new(JavaType::Integer, "SMALLINT"),
        "bigint" | "BIGINT" => MappedType::new(JavaType::Long, "BIGINT"),
        "float" | "FLOAT" => MappedType::new(JavaType::Float, "FLOAT"),
        "double" | "DOUBLE" => MappedType::new(JavaType::Double, "DOUBLE"),
        "decimal" | "DECIMAL" => MappedType::new(JavaType::BigDecimal, "DECIMAL"),
        "numeric" | "NUMERIC" => MappedType::new(JavaType::BigDecimal, "NUMERIC"),
        "real" | "REAL" => MappedType::new(JavaType::Object, "REAL"),
        "char" | "CHAR" => MappedType::new(JavaType::String, "CHAR"),
        "varchar" | "VARCHAR" => MappedType::new(JavaType::String, "VARCHAR"),
        "text" | "TEXT" | "clob" | "CLOB" => MappedType::new(JavaType::String, "CLOB"),
        "date" | "DATE" => MappedType::new(JavaType::Date, "DATE"),
        "time" | "TIME" => MappedType::new(JavaType::Time, "TIME"),
        "datetime" | "DATETIME" | "timestamp" | "TIMESTAMP" => {
            MappedType::new(JavaType::Timestamp, "TIMESTAMP")
        }
        "blob" | "BLOB" => MappedType::new(JavaType::ByteArray, "BLOB"),
        "bit" | "BIT" => MappedType::new(JavaType::Byte, "BIT"),
        _ => MappedType::new(JavaType::Object, ""),
    }
}
