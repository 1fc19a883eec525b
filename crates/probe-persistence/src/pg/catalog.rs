//! Metadata de catálogo sobre `pg_catalog`.
//!
//! Se lee `pg_class`/`pg_namespace`/`pg_attribute` directamente: a
//! diferencia de `information_schema`, no filtra por privilegios del rol, de
//! modo que una tabla sin grants para el rol de migración sigue existiendo.
//! Incluye todos los relkind (vistas materializadas, tablas particionadas,
//! foráneas, secuencias...).
//!
//! Semántica de filtros: catálogo/schema `NULL` = sin filtro; nombres de
//! tabla y columna por igualdad exacta. Postgres guarda los identificadores
//! no citados en minúsculas, así que `Orders` solo coincide si se creó
//! citado.

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Bool, Integer, Nullable, Text};
use probe_core::{CatalogConnection, CatalogError, ColumnFilter, ColumnRow, TableFilter, TableRow};

use super::PgPooledConnection;
use crate::error::PersistenceError;

const CURRENT_CATALOG_SQL: &str = "SELECT current_database()::text AS value";

const TABLES_SQL: &str = "\
SELECT current_database()::text AS table_catalog, n.nspname::text AS table_schema, \
       c.relname::text AS table_name, \
       CASE c.relkind WHEN 'r' THEN 'TABLE' WHEN 'p' THEN 'PARTITIONED TABLE' WHEN 'v' THEN 'VIEW' \
                      WHEN 'm' THEN 'MATERIALIZED VIEW' WHEN 'f' THEN 'FOREIGN TABLE' \
                      WHEN 'S' THEN 'SEQUENCE' WHEN 'i' THEN 'INDEX' WHEN 'I' THEN 'PARTITIONED INDEX' \
                      WHEN 'c' THEN 'TYPE' ELSE 'OTHER' END AS table_type \
FROM pg_catalog.pg_class c \
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
WHERE ($1::text IS NULL OR current_database()::text = $1) \
  AND ($2::text IS NULL OR n.nspname::text = $2) \
  AND c.relname::text = $3 \
ORDER BY n.nspname, c.relname";

const COLUMNS_SQL: &str = "\
SELECT current_database()::text AS table_catalog, n.nspname::text AS table_schema, \
       c.relname::text AS table_name, a.attname::text AS column_name, \
       pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type, \
       a.attnum::int4 AS ordinal_position, (NOT a.attnotnull) AS is_nullable \
FROM pg_catalog.pg_attribute a \
JOIN pg_catalog.pg_class c ON c.oid = a.attrelid \
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
WHERE ($1::text IS NULL OR current_database()::text = $1) \
  AND ($2::text IS NULL OR n.nspname::text = $2) \
  AND c.relname::text = $3 \
  AND a.attname::text = $4 \
  AND a.attnum > 0 \
  AND NOT a.attisdropped \
ORDER BY n.nspname, a.attnum";

#[derive(QueryableByName, Debug)]
struct ScalarRecord {
    #[diesel(sql_type = Nullable<Text>)]
    value: Option<String>,
}

#[derive(QueryableByName, Debug)]
struct TableRecord {
    #[diesel(sql_type = Nullable<Text>)]
    table_catalog: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    table_schema: Option<String>,
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    table_type: Option<String>,
}

impl From<TableRecord> for TableRow {
    fn from(r: TableRecord) -> Self {
        TableRow { catalog: r.table_catalog,
                   schema: r.table_schema,
                   name: r.table_name,
                   table_type: r.table_type.unwrap_or_default() }
    }
}

#[derive(QueryableByName, Debug)]
struct ColumnRecord {
    #[diesel(sql_type = Nullable<Text>)]
    table_catalog: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    table_schema: Option<String>,
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    data_type: Option<String>,
    #[diesel(sql_type = Integer)]
    ordinal_position: i32,
    #[diesel(sql_type = Bool)]
    is_nullable: bool,
}

impl From<ColumnRecord> for ColumnRow {
    fn from(r: ColumnRecord) -> Self {
        ColumnRow { catalog: r.table_catalog,
                    schema: r.table_schema,
                    table: r.table_name,
                    name: r.column_name,
                    data_type: r.data_type.unwrap_or_default(),
                    ordinal: r.ordinal_position,
                    nullable: r.is_nullable }
    }
}

fn catalog_err(e: diesel::result::Error) -> CatalogError {
    CatalogError::from(PersistenceError::from(e))
}

/// Envuelve una consulta de una columna para leer su primer valor como texto.
fn scalar_sql(sql: &str) -> String {
    let inner = sql.trim().trim_end_matches(';');
    format!("SELECT CAST(q.value AS text) AS value FROM ({inner}) AS q(value) LIMIT 1")
}

/// Handle de catálogo sobre una conexión prestada por el pool.
pub struct PgCatalogConnection {
    conn: PgPooledConnection,
}

impl PgCatalogConnection {
    pub fn new(conn: PgPooledConnection) -> Self {
        Self { conn }
    }
}

impl CatalogConnection for PgCatalogConnection {
    fn catalog(&mut self) -> Result<Option<String>, CatalogError> {
        let rows: Vec<ScalarRecord> = sql_query(CURRENT_CATALOG_SQL).load(&mut *self.conn).map_err(catalog_err)?;
        Ok(rows.into_iter().next().and_then(|r| r.value))
    }

    fn query_scalar(&mut self, sql: &str) -> Result<Option<String>, CatalogError> {
        let rows: Vec<ScalarRecord> = sql_query(scalar_sql(sql)).load(&mut *self.conn).map_err(catalog_err)?;
        Ok(rows.into_iter().next().and_then(|r| r.value))
    }

    fn tables(&mut self, filter: &TableFilter<'_>) -> Result<Vec<TableRow>, CatalogError> {
        let rows: Vec<TableRecord> = sql_query(TABLES_SQL).bind::<Nullable<Text>, _>(filter.catalog)
                                                          .bind::<Nullable<Text>, _>(filter.schema)
                                                          .bind::<Text, _>(filter.table)
                                                          .load(&mut *self.conn)
                                                          .map_err(catalog_err)?;
        Ok(rows.into_iter().map(TableRow::from).collect())
    }

    fn columns(&mut self, filter: &ColumnFilter<'_>) -> Result<Vec<ColumnRow>, CatalogError> {
        let rows: Vec<ColumnRecord> = sql_query(COLUMNS_SQL).bind::<Nullable<Text>, _>(filter.table.catalog)
                                                            .bind::<Nullable<Text>, _>(filter.table.schema)
                                                            .bind::<Text, _>(filter.table.table)
                                                            .bind::<Text, _>(filter.column)
                                                            .load(&mut *self.conn)
                                                            .map_err(catalog_err)?;
        Ok(rows.into_iter().map(ColumnRow::from).collect())
    }
}
