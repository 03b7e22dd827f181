//! Default configuration values - single source of truth

/// Default database host
pub const HOST: &str = "localhost";

/// Default database port
pub const PORT: u16 = 3306;

/// Default database port, as offered by prompts
pub const PORT_STR: &str = "3306";

/// Default database user
pub const USER: &str = "root";

/// Default entity package (relative to the root package)
pub const ENTITY_PACKAGE: &str = "entity";

/// Default mapper interface package (relative to the root package)
pub const MAPPER_PACKAGE: &str = "mapper";

/// Default mapper XML directory (relative to the root path)
pub const MAPPER_XML_PATH: &str = "mapper";

/// Default query package (relative to the root package)
pub const QUERY_PACKAGE: &str = "model.query";

/// Prefix of environment variables read by `ExportConfig::load`
pub const ENV_PREFIX: &str = "MYBATIS_EXPORT";
