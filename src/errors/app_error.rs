use probe_core::{DbType, ProbeError};
use probe_persistence::PersistenceError;
use thiserror::Error;

/// Errores de la capa de aplicación (configuración + armado del DAO).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Dialecto sin sondas de upgrade: {0}")]
    UnsupportedDialect(DbType),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Error de sonda: {0}")]
    Probe(#[from] ProbeError),
    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<probe_core::UnknownDialect> for AppError {
    fn from(err: probe_core::UnknownDialect) -> Self {
        AppError::Config(err.to_string())
    }
}
