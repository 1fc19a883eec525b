//! Contratos de conexión y de metadata de catálogo.
//!
//! Una `ConnectionSource` entrega handles exclusivos (`Conn`); soltar el
//! handle (`Drop`) equivale a liberarlo (devolverlo al pool si es pooled).
//! Las filas de metadata se materializan dentro de la llamada, de modo que
//! ningún cursor sobrevive al handle que lo produjo.

use serde::Serialize;

use crate::errors::{CatalogError, ConnectionError};

/// Filtro de tablas. `None` significa "sin filtro" para catálogo/schema; el
/// nombre de tabla se compara de forma exacta (sin comodines).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFilter<'a> {
    pub catalog: Option<&'a str>,
    pub schema: Option<&'a str>,
    pub table: &'a str,
}

impl<'a> TableFilter<'a> {
    /// Construye el filtro; un schema vacío se trata como "sin filtro"
    /// (resolución por defecto del catálogo).
    pub fn new(catalog: Option<&'a str>, schema: &'a str, table: &'a str) -> Self {
        let schema = if schema.is_empty() { None } else { Some(schema) };
        Self { catalog, schema, table }
    }
}

/// Filtro de columnas: tabla + nombre exacto de columna.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFilter<'a> {
    pub table: TableFilter<'a>,
    pub column: &'a str,
}

/// Fila del listado de tablas del catálogo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
    /// `TABLE`, `VIEW`, `MATERIALIZED VIEW`, ... según el catálogo.
    pub table_type: String,
}

/// Fila del listado de columnas del catálogo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRow {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub table: String,
    pub name: String,
    pub data_type: String,
    pub ordinal: i32,
    pub nullable: bool,
}

/// Conexión viva capaz de responder preguntas de metadata.
///
/// Equivale a la metadata genérica del driver: el dialecto decide qué SQL
/// envía por `query_scalar`, pero el listado de tablas/columnas es común.
pub trait CatalogConnection {
    /// Catálogo (base de datos) al que está atada la conexión, si el motor
    /// lo expone.
    fn catalog(&mut self) -> Result<Option<String>, CatalogError>;

    /// Ejecuta una consulta de una columna y devuelve el valor de la primera
    /// fila. `None` si no hay filas o el valor es NULL.
    fn query_scalar(&mut self, sql: &str) -> Result<Option<String>, CatalogError>;

    /// Lista las tablas que cumplen el filtro.
    fn tables(&mut self, filter: &TableFilter<'_>) -> Result<Vec<TableRow>, CatalogError>;

    /// Lista las columnas que cumplen el filtro.
    fn columns(&mut self, filter: &ColumnFilter<'_>) -> Result<Vec<ColumnRow>, CatalogError>;
}

/// Proveedor abstracto de conexiones.
///
/// Contrato:
/// - `acquire` devuelve un handle exclusivo o `ConnectionError`.
/// - El handle se libera al salir de scope, en cualquier camino de salida.
/// - La fuente se comparte entre hilos; cada llamada obtiene su propio handle.
pub trait ConnectionSource: Send + Sync + 'static {
    type Conn: CatalogConnection;

    fn acquire(&self) -> Result<Self::Conn, ConnectionError>;
}
