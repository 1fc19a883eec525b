//! Identificador del motor de base de datos al que apunta un DAO de upgrade.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::UnknownDialect;

/// Motor de base de datos destino. Fijo durante la vida de cada DAO y
/// determina qué estrategia de resolución de schema se usa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DbType {
    Mysql,
    Postgresql,
    H2,
}

impl DbType {
    /// Nombre canónico en mayúsculas (`POSTGRESQL`, `MYSQL`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            DbType::Mysql => "MYSQL",
            DbType::Postgresql => "POSTGRESQL",
            DbType::H2 => "H2",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbType {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(DbType::Mysql),
            "postgresql" | "postgres" | "pg" => Ok(DbType::Postgresql),
            "h2" => Ok(DbType::H2),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}
