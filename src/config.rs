//! Configuración central de la aplicación.
//! Carga variables de entorno (.env), elige el dialecto (`DATABASE_TYPE`) y
//! arma el `UpgradeDao` correspondiente que usará el orquestador.

use std::env;

use log::info;
use probe_core::{DbType, UpgradeDao};
use probe_persistence::{build_pool_from_config, init_dotenv, DbConfig, PersistenceError, PgUpgradeDao, PoolProvider};

use crate::errors::AppError;

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Motor destino; por defecto PostgreSQL.
    pub dialect: DbType,
    /// Configuración específica de base de datos.
    pub database: DbConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let dialect = match lookup("DATABASE_TYPE") {
            Some(raw) => raw.parse::<DbType>()?,
            None => DbType::Postgresql,
        };
        let database = DbConfig::from_lookup(&lookup).map_err(|e| match e {
                                                         PersistenceError::Config(msg) => AppError::Config(msg),
                                                         other => AppError::Persistence(other),
                                                     })?;
        Ok(Self { dialect, database })
    }
}

/// Construye el DAO del dialecto configurado. Los dialectos sin sondas se
/// rechazan antes de abrir conexiones.
pub fn build_upgrade_dao(cfg: &AppConfig) -> Result<Box<dyn UpgradeDao>, AppError> {
    match cfg.dialect {
        DbType::Postgresql => {
            let pool = build_pool_from_config(&cfg.database)?;
            info!("upgrade dao ready: dialect={} max_connections={}", cfg.dialect, cfg.database.max_connections);
            Ok(Box::new(PgUpgradeDao::new(PoolProvider::new(pool))))
        }
        other => Err(AppError::UnsupportedDialect(other)),
    }
}
