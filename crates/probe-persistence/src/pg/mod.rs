//! Fuente de conexiones PostgreSQL (Diesel + r2d2) para las sondas de schema.
//!
//! - `PoolProvider` implementa `ConnectionSource`: cada `acquire` hace un
//!   checkout del pool y el handle vuelve al pool al soltarse.
//! - `PgCatalogConnection` responde la metadata leyendo
//!   `pg_catalog` (ver `catalog`).
//! - Esta capa no reintenta ni agrega timeouts propios; el timeout de
//!   checkout es el del pool (`connection_timeout`).

mod catalog;

pub use catalog::PgCatalogConnection;

use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use log::{debug, warn};
use probe_core::{ConnectionError, ConnectionSource};

use crate::config::{DbConfig, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::error::PersistenceError;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Conexión prestada por el pool; vuelve al pool en `Drop`.
pub type PgPooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Implementación concreta de `ConnectionSource` respaldada por un `PgPool`.
#[derive(Clone)]
pub struct PoolProvider {
    pub pool: PgPool,
}

impl PoolProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ConnectionSource for PoolProvider {
    type Conn = PgCatalogConnection;

    fn acquire(&self) -> Result<PgCatalogConnection, ConnectionError> {
        let conn = self.pool.get().map_err(PersistenceError::from)?;
        debug!("acquire: checked out (idle={})", self.pool.state().idle_connections);
        Ok(PgCatalogConnection::new(conn))
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Comportamiento:
/// - Valida y ajusta tamaños (si `min_size > max_size`, usa `min_size =
///   max_size`; ceros se elevan a 1).
/// - Falla con `PersistenceError::Pool` si no se pueden abrir las conexiones
///   mínimas dentro de `timeout`.
pub fn build_pool_with_timeout(database_url: &str,
                               min_size: u32,
                               max_size: u32,
                               timeout: Duration)
                               -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), using min=max");
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .connection_timeout(timeout)
                                    .build(manager)?;
    debug!("build_pool: min_idle={final_min} max_size={validated_max}");
    Ok(pool)
}

/// `build_pool_with_timeout` con el timeout por defecto.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    build_pool_with_timeout(database_url, min_size, max_size, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
}

pub fn build_pool_from_config(cfg: &DbConfig) -> Result<PgPool, PersistenceError> {
    build_pool_with_timeout(&cfg.url, cfg.min_connections, cfg.max_connections, cfg.connect_timeout)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye el pool.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = DbConfig::from_env()?;
    build_pool_from_config(&cfg)
}
