//! Taxonomía de errores de las sondas de schema.
//!
//! - `ConnectionError`: no se pudo obtener una conexión. Lleva su propia
//!   clasificación: pool agotado o servidor caído es transitorio; credenciales
//!   o base inexistente no se arreglan reintentando.
//! - `CatalogError`: fallo del driver al consultar el catálogo.
//! - `SchemaResolutionFailure`: la resolución de schema falló; se recupera
//!   localmente (schema vacío).
//! - `ProbeError`: la consulta de existencia falló; se propaga al llamador y
//!   nunca se convierte en `false`.

use thiserror::Error;

/// El valor no corresponde a ningún `DbType` conocido.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown database type: {0}")]
pub struct UnknownDialect(pub String);

/// No se pudo obtener una conexión utilizable de la fuente.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("connection unavailable: {message}")]
pub struct ConnectionError {
    message: String,
    transient: bool,
}

impl ConnectionError {
    /// Timeout de checkout, servidor inalcanzable, conexión caída.
    pub fn transient(message: impl Into<String>) -> Self {
        Self { message: message.into(), transient: true }
    }

    /// Autenticación rechazada, base o rol inexistente, URL inválida.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self { message: message.into(), transient: false }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }
}

/// Fallo del driver al ejecutar una consulta de catálogo.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Conexión perdida, timeout o conflicto de serialización a mitad de consulta.
    #[error("catalog query interrupted: {0}")]
    Interrupted(String),
    /// Sintaxis, permisos o incompatibilidad del driver.
    #[error("catalog query rejected: {0}")]
    Rejected(String),
}

impl CatalogError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::Interrupted(_))
    }
}

/// Motivo por el que no se pudo resolver el schema actual.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaResolutionFailure {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("current schema query failed: {0}")]
    Query(#[from] CatalogError),
    #[error("current schema query returned no value")]
    NoRows,
}

/// Fallo de una sonda de existencia (tabla o columna).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("table probe failed for `{table}`: {source}")]
    Table {
        table: String,
        #[source]
        source: CatalogError,
    },
    #[error("column probe failed for `{table}.{column}`: {source}")]
    Column {
        table: String,
        column: String,
        #[source]
        source: CatalogError,
    },
}

impl ProbeError {
    /// Indica si el orquestador podría reintentar. Esta capa no reintenta.
    pub fn is_transient(&self) -> bool {
        match self {
            ProbeError::Connection(e) => e.is_transient(),
            ProbeError::Table { source, .. } | ProbeError::Column { source, .. } => source.is_transient(),
        }
    }
}
