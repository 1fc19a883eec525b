//! Contrato que el orquestador de upgrades consume, independiente del
//! dialecto. Se elige una implementación por motor al arrancar.

mod postgresql;

pub use postgresql::{PostgresqlUpgradeDao, POSTGRESQL_SCRIPT_ROOT};

use crate::catalog::{ColumnRow, TableRow};
use crate::dialect::DbType;
use crate::errors::ProbeError;

/// DAO de upgrade de un motor concreto.
pub trait UpgradeDao: Send + Sync {
    /// Motor al que apunta esta instancia.
    fn dialect(&self) -> DbType;

    /// Raíz relativa de los scripts SQL versionados de este dialecto.
    fn script_root_path(&self) -> &str;

    /// Schema actual; `""` si no pudo resolverse.
    fn resolve_current_schema(&self) -> String;

    /// Filas del catálogo que coinciden con `table` en el schema actual.
    fn find_tables(&self, table: &str) -> Result<Vec<TableRow>, ProbeError>;

    /// Filas del catálogo para `table.column` en el schema actual.
    fn find_columns(&self, table: &str, column: &str) -> Result<Vec<ColumnRow>, ProbeError>;

    fn table_exists(&self, table: &str) -> Result<bool, ProbeError>;

    fn column_exists(&self, table: &str, column: &str) -> Result<bool, ProbeError>;
}
