//! upgrade-probe
//!
//! Este crate arma la capa de sondas para el driver de migraciones:
//! - Expone `config` para leer el dialecto y la conexión del entorno y
//!   construir el `UpgradeDao` correspondiente.
//! - Expone `errors` para los errores de aplicación.
//!
//! Las sondas en sí viven en `probe-core` (contrato) y `probe-persistence`
//! (backend PostgreSQL).

pub mod config;
pub mod errors;

pub use config::{build_upgrade_dao, AppConfig};
pub use errors::AppError;
pub use probe_core::{ColumnRow, DbType, GuardedStep, Precondition, ProbeError, StepDecision, TableRow, UpgradeDao};
