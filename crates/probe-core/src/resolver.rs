//! Resolución del schema contra el que se resuelven referencias no
//! calificadas para una conexión dada.

use crate::catalog::CatalogConnection;
use crate::errors::CatalogError;

/// Consulta canónica de PostgreSQL para el schema actual.
pub const POSTGRES_CURRENT_SCHEMA: &str = "select current_schema()";

/// Estrategia de resolución de schema de un dialecto.
pub trait SchemaResolver: Send + Sync {
    /// Devuelve el schema actual de la conexión, o `None` si la consulta no
    /// produjo valor.
    fn current_schema(&self, conn: &mut dyn CatalogConnection) -> Result<Option<String>, CatalogError>;
}

/// Resolver basado en una consulta escalar del dialecto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySchemaResolver {
    query: &'static str,
}

impl QuerySchemaResolver {
    pub const fn new(query: &'static str) -> Self {
        Self { query }
    }

    pub const fn postgresql() -> Self {
        Self::new(POSTGRES_CURRENT_SCHEMA)
    }

    pub fn query(&self) -> &'static str {
        self.query
    }
}

impl SchemaResolver for QuerySchemaResolver {
    fn current_schema(&self, conn: &mut dyn CatalogConnection) -> Result<Option<String>, CatalogError> {
        conn.query_scalar(self.query)
    }
}
