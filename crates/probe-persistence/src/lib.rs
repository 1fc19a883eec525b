//! probe-persistence
//!
//! Backend PostgreSQL (Diesel + r2d2) de las sondas de schema de
//! `probe-core`.
//!
//! Módulos:
//! - `pg`: pool, `PoolProvider` (`ConnectionSource`) y metadata vía
//!   `pg_catalog`.
//! - `config`: carga de configuración desde .env.
//! - `error`: mapeo de errores Diesel/r2d2 al contrato de sondas.

pub mod config;
pub mod error;
pub mod pg;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, build_pool_from_config, PgCatalogConnection, PgPool, PoolProvider};

/// DAO de upgrade PostgreSQL respaldado por el pool.
pub type PgUpgradeDao = probe_core::PostgresqlUpgradeDao<PoolProvider>;
