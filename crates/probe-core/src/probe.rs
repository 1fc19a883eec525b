//! Sondas de existencia sobre la metadata del catálogo.
//!
//! Política de errores:
//! - Resolución de schema: fail-soft. Se loguea y se usa `""` (sin filtro
//!   de schema), porque la búsqueda no calificada sigue siendo útil.
//! - Existencia de tabla/columna: fail-hard. Se loguea y se devuelve
//!   `ProbeError`; un `false` siempre significa "ausente confirmado".
//!
//! Cada llamada obtiene su propio handle y lo libera antes de retornar. Las
//! filas devueltas son copias materializadas; ningún cursor sobrevive al
//! handle.

use log::{debug, error, warn};

use crate::catalog::{CatalogConnection, ColumnFilter, ColumnRow, ConnectionSource, TableFilter, TableRow};
use crate::errors::{ProbeError, SchemaResolutionFailure};
use crate::resolver::SchemaResolver;

/// Sonda genérica: fuente de conexiones + estrategia de schema del dialecto.
#[derive(Debug)]
pub struct CatalogProbe<S, R> {
    source: S,
    resolver: R,
}

fn resolve_on<R: SchemaResolver + ?Sized>(resolver: &R,
                                          conn: &mut dyn CatalogConnection)
                                          -> Result<String, SchemaResolutionFailure> {
    resolver.current_schema(conn)?.ok_or(SchemaResolutionFailure::NoRows)
}

fn schema_or_default(resolved: Result<String, SchemaResolutionFailure>) -> String {
    match resolved {
        Ok(schema) => schema,
        Err(SchemaResolutionFailure::NoRows) => {
            warn!("resolve_current_schema: no value returned, falling back to catalog default");
            String::new()
        }
        Err(e) => {
            error!("resolve_current_schema:failed err={e}");
            String::new()
        }
    }
}

impl<S: ConnectionSource, R: SchemaResolver> CatalogProbe<S, R> {
    pub fn new(source: S, resolver: R) -> Self {
        Self { source, resolver }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolución estricta del schema actual sobre un handle propio.
    pub fn try_resolve_current_schema(&self) -> Result<String, SchemaResolutionFailure> {
        let mut conn = self.source.acquire()?;
        resolve_on(&self.resolver, &mut conn)
    }

    /// Schema actual, o `""` si no pudo resolverse. Nunca falla.
    pub fn resolve_current_schema(&self) -> String {
        debug!("resolve_current_schema:start");
        let schema = schema_or_default(self.try_resolve_current_schema());
        debug!("resolve_current_schema:done schema={schema:?}");
        schema
    }

    /// Filas del catálogo que coinciden con `table` en el schema visible.
    pub fn find_tables(&self, table: &str) -> Result<Vec<TableRow>, ProbeError> {
        debug!("find_tables:start table={table}");
        let result = self.load_tables(table);
        match &result {
            Ok(rows) => debug!("find_tables:done table={table} rows={}", rows.len()),
            Err(e) => error!("find_tables:failed table={table} err={e}"),
        }
        result
    }

    /// Filas del catálogo para `table.column` en el schema visible.
    pub fn find_columns(&self, table: &str, column: &str) -> Result<Vec<ColumnRow>, ProbeError> {
        debug!("find_columns:start table={table} column={column}");
        let result = self.load_columns(table, column);
        match &result {
            Ok(rows) => debug!("find_columns:done table={table} column={column} rows={}", rows.len()),
            Err(e) => error!("find_columns:failed table={table} column={column} err={e}"),
        }
        result
    }

    pub fn table_exists(&self, table: &str) -> Result<bool, ProbeError> {
        self.find_tables(table).map(|rows| !rows.is_empty())
    }

    pub fn column_exists(&self, table: &str, column: &str) -> Result<bool, ProbeError> {
        self.find_columns(table, column).map(|rows| !rows.is_empty())
    }

    fn load_tables(&self, table: &str) -> Result<Vec<TableRow>, ProbeError> {
        let wrap = |source| ProbeError::Table { table: table.to_string(), source };
        let mut conn = self.source.acquire()?;
        let catalog = conn.catalog().map_err(wrap)?;
        let schema = schema_or_default(resolve_on(&self.resolver, &mut conn));
        let filter = TableFilter::new(catalog.as_deref(), &schema, table);
        let rows = conn.tables(&filter).map_err(wrap)?;
        Ok(rows)
    }

    fn load_columns(&self, table: &str, column: &str) -> Result<Vec<ColumnRow>, ProbeError> {
        let wrap = |source| ProbeError::Column { table: table.to_string(), column: column.to_string(), source };
        let mut conn = self.source.acquire()?;
        let catalog = conn.catalog().map_err(wrap)?;
        let schema = schema_or_default(resolve_on(&self.resolver, &mut conn));
        let filter = ColumnFilter { table: TableFilter::new(catalog.as_deref(), &schema, table), column };
        let rows = conn.columns(&filter).map_err(wrap)?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CatalogError, ConnectionError};
    use crate::memory::{Failures, InMemoryCatalog, InMemorySource};
    use crate::resolver::{QuerySchemaResolver, POSTGRES_CURRENT_SCHEMA};

    fn probe_with(schema: Option<&str>) -> CatalogProbe<InMemorySource, QuerySchemaResolver> {
        let mut cat = InMemoryCatalog::new(Some("appdb")).with_scalar(POSTGRES_CURRENT_SCHEMA, schema);
        cat.create_table("public", "orders");
        cat.add_column("public", "orders", "id", "bigint");
        cat.create_table("audit", "events");
        CatalogProbe::new(InMemorySource::new(cat), QuerySchemaResolver::postgresql())
    }

    #[test]
    fn resolves_current_schema() {
        let probe = probe_with(Some("public"));
        assert_eq!(probe.resolve_current_schema(), "public");
        assert_eq!(probe.source().outstanding(), 0);
    }

    #[test]
    fn schema_without_rows_is_empty_string() {
        let probe = probe_with(None);
        assert_eq!(probe.try_resolve_current_schema(), Err(SchemaResolutionFailure::NoRows));
        assert_eq!(probe.resolve_current_schema(), "");
    }

    #[test]
    fn schema_query_failure_is_soft() {
        let probe = probe_with(Some("public"));
        probe.source().set_failures(Failures { scalar: Some(CatalogError::Rejected("boom".into())), ..Default::default() });
        assert_eq!(probe.resolve_current_schema(), "");
        assert_eq!(probe.source().outstanding(), 0);
    }

    #[test]
    fn schema_acquire_failure_is_soft() {
        let probe = probe_with(Some("public"));
        probe.source().set_failures(Failures { acquire: Some(ConnectionError::transient("refused")), ..Default::default() });
        assert_eq!(probe.resolve_current_schema(), "");
    }

    #[test]
    fn table_lookup_is_scoped_to_resolved_schema() {
        let probe = probe_with(Some("public"));
        assert!(probe.table_exists("orders").unwrap());
        // `events` vive en `audit`, no en el schema actual
        assert!(!probe.table_exists("events").unwrap());
    }

    #[test]
    fn failed_schema_resolution_searches_all_schemas() {
        let probe = probe_with(Some("public"));
        probe.source().set_failures(Failures { scalar: Some(CatalogError::Interrupted("reset".into())), ..Default::default() });
        assert!(probe.table_exists("events").unwrap());
    }

    #[test]
    fn one_checkout_per_probe_call() {
        let probe = probe_with(Some("public"));
        probe.table_exists("orders").unwrap();
        probe.column_exists("orders", "id").unwrap();
        assert_eq!(probe.source().checkouts(), 2);
        assert_eq!(probe.source().outstanding(), 0);
    }

    #[test]
    fn catalog_failure_is_escalated() {
        let probe = probe_with(Some("public"));
        probe.source().set_failures(Failures { catalog: Some(CatalogError::Interrupted("gone".into())), ..Default::default() });
        let err = probe.table_exists("orders").unwrap_err();
        assert!(matches!(err, ProbeError::Table { .. }));
        assert_eq!(probe.source().outstanding(), 0);
    }

    #[test]
    fn find_columns_returns_rows() {
        let probe = probe_with(Some("public"));
        let rows = probe.find_columns("orders", "id").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].data_type, "bigint");
        assert_eq!(rows[0].ordinal, 1);
    }
}
