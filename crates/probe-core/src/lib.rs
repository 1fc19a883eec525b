//! probe-core: sondas de schema para upgrades versionados.
//!
//! Antes de aplicar un script SQL numerado, el orquestador pregunta qué
//! schema está activo y si una tabla o columna ya existe, para saltar o
//! aplicar DDL de forma idempotente. Este crate define el contrato y la
//! estrategia por dialecto, sin depender de ningún driver concreto.
//!
//! Módulos:
//! - `catalog`: `ConnectionSource` / `CatalogConnection` y filas de metadata.
//! - `resolver`: resolución del schema actual por dialecto.
//! - `probe`: sondas de existencia (fail-soft schema, fail-hard existencia).
//! - `upgrade`: trait `UpgradeDao` y la implementación PostgreSQL.
//! - `guard`: precondiciones de pasos DDL.
//! - `memory`: backend en memoria con inyección de fallos.

pub mod catalog;
pub mod dialect;
pub mod errors;
pub mod guard;
pub mod memory;
pub mod probe;
pub mod resolver;
pub mod upgrade;

pub use catalog::{CatalogConnection, ColumnFilter, ColumnRow, ConnectionSource, TableFilter, TableRow};
pub use dialect::DbType;
pub use errors::{CatalogError, ConnectionError, ProbeError, SchemaResolutionFailure, UnknownDialect};
pub use guard::{GuardedStep, Precondition, StepDecision};
pub use memory::{InMemoryCatalog, InMemorySource};
pub use probe::CatalogProbe;
pub use resolver::{QuerySchemaResolver, SchemaResolver, POSTGRES_CURRENT_SCHEMA};
pub use upgrade::{PostgresqlUpgradeDao, UpgradeDao, POSTGRESQL_SCRIPT_ROOT};
