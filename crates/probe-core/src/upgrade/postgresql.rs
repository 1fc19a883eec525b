use crate::catalog::{ColumnRow, ConnectionSource, TableRow};
use crate::dialect::DbType;
use crate::errors::{ProbeError, SchemaResolutionFailure};
use crate::probe::CatalogProbe;
use crate::resolver::QuerySchemaResolver;
use crate::upgrade::UpgradeDao;

pub const POSTGRESQL_SCRIPT_ROOT: &str = "create/release-1.2.0_schema/postgresql";

/// DAO de upgrade para PostgreSQL: schema vía `select current_schema()`.
pub struct PostgresqlUpgradeDao<S> {
    probe: CatalogProbe<S, QuerySchemaResolver>,
}

impl<S: ConnectionSource> PostgresqlUpgradeDao<S> {
    pub fn new(source: S) -> Self {
        Self { probe: CatalogProbe::new(source, QuerySchemaResolver::postgresql()) }
    }

    pub fn source(&self) -> &S {
        self.probe.source()
    }

    pub fn try_resolve_current_schema(&self) -> Result<String, SchemaResolutionFailure> {
        self.probe.try_resolve_current_schema()
    }
}

impl<S: ConnectionSource> UpgradeDao for PostgresqlUpgradeDao<S> {
    fn dialect(&self) -> DbType {
        DbType::Postgresql
    }

    fn script_root_path(&self) -> &str {
        POSTGRESQL_SCRIPT_ROOT
    }

    fn resolve_current_schema(&self) -> String {
        self.probe.resolve_current_schema()
    }

    fn find_tables(&self, table: &str) -> Result<Vec<TableRow>, ProbeError> {
        self.probe.find_tables(table)
    }

    fn find_columns(&self, table: &str, column: &str) -> Result<Vec<ColumnRow>, ProbeError> {
        self.probe.find_columns(table, column)
    }

    fn table_exists(&self, table: &str) -> Result<bool, ProbeError> {
        self.probe.table_exists(table)
    }

    fn column_exists(&self, table: &str, column: &str) -> Result<bool, ProbeError> {
        self.probe.column_exists(table, column)
    }
}
