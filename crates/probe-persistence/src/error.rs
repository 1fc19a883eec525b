//! Errores de persistencia.
//! Mapea errores de Diesel / r2d2 a variantes semánticas y de ahí a los
//! errores del contrato de sondas (`CatalogError`, `ConnectionError`).

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use probe_core::{CatalogError, ConnectionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("connection lost: {0}")]
    ConnectionLost(String),
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("database error: {0}")]
    Database(String),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand => {
                    Self::ConnectionLost(info.message().to_string())
                }
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::Unknown => Self::Database(info.message().to_string()),
                other => Self::Database(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::NotFound => Self::Unknown("not found".into()),
            DieselError::DeserializationError(e) => Self::Unknown(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Unknown(format!("ser: {e}")),
            DieselError::QueryBuilderError(e) => Self::Unknown(format!("query builder: {e}")),
            DieselError::InvalidCString(e) => Self::Unknown(format!("invalid cstring: {e}")),
            DieselError::BrokenTransactionManager => Self::ConnectionLost("broken transaction manager".into()),
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<r2d2::Error> for PersistenceError {
    fn from(err: r2d2::Error) -> Self {
        Self::Pool(err.to_string())
    }
}

/// Fallos de conexión que ningún reintento va a resolver: credenciales,
/// `pg_hba.conf`, base o rol inexistente, URL mal formada.
fn is_fatal_connect(msg: &str) -> bool {
    let m = msg.to_lowercase();
    m.contains("password authentication failed")
    || m.contains("no pg_hba.conf entry")
    || m.contains("does not exist")
    || m.contains("authentication method")
    || m.contains("invalid connection")
    || m.contains("invalid port")
}

impl PersistenceError {
    /// Determina si el fallo es transitorio (la operación podría reintentarse).
    ///
    /// Algunos mensajes de desconexión/timeout llegan como error genérico de
    /// base; se detectan por texto (best-effort, sin acoplar a SQLSTATE).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::SerializationConflict | Self::ConnectionLost(_) => true,
            Self::Pool(msg) => !is_fatal_connect(msg),
            Self::Database(msg) | Self::Unknown(msg) => {
                let m = msg.to_lowercase();
                m.contains("deadlock detected")
                || m.contains("terminating connection due to administrator command")
                || m.contains("connection closed")
                || m.contains("connection refused")
                || m.contains("canceling statement due to statement timeout")
                || m.contains("timeout")
            }
            Self::Config(_) => false,
        }
    }
}

impl From<PersistenceError> for CatalogError {
    fn from(err: PersistenceError) -> Self {
        if err.is_transient() {
            CatalogError::Interrupted(err.to_string())
        } else {
            CatalogError::Rejected(err.to_string())
        }
    }
}

impl From<PersistenceError> for ConnectionError {
    fn from(err: PersistenceError) -> Self {
        if err.is_transient() {
            ConnectionError::transient(err.to_string())
        } else {
            ConnectionError::fatal(err.to_string())
        }
    }
}
