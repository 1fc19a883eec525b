//! Backend en memoria de `ConnectionSource`.
//!
//! Reproduce la semántica de filtros del catálogo (nombres exactos, schema
//! `None` = sin filtro) y además:
//! - permite inyectar fallos por etapa (`Failures`),
//! - cuenta checkouts totales y handles pendientes (`outstanding`), para
//!   verificar que ninguna sonda deja conexiones abiertas.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::catalog::{CatalogConnection, ColumnFilter, ColumnRow, ConnectionSource, TableFilter, TableRow};
use crate::errors::{CatalogError, ConnectionError};

/// Contenido del catálogo simulado.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    pub catalog: Option<String>,
    /// Consultas escalares conocidas: sql -> valor de la primera fila
    /// (`None` = sin filas).
    pub scalars: HashMap<String, Option<String>>,
    pub tables: Vec<TableRow>,
    pub columns: Vec<ColumnRow>,
}

impl InMemoryCatalog {
    pub fn new(catalog: Option<&str>) -> Self {
        Self { catalog: catalog.map(str::to_string), ..Default::default() }
    }

    pub fn with_scalar(mut self, sql: &str, value: Option<&str>) -> Self {
        self.scalars.insert(sql.trim().to_string(), value.map(str::to_string));
        self
    }

    pub fn create_table(&mut self, schema: &str, name: &str) {
        self.tables.push(TableRow { catalog: self.catalog.clone(),
                                    schema: Some(schema.to_string()),
                                    name: name.to_string(),
                                    table_type: "TABLE".to_string() });
    }

    pub fn add_column(&mut self, schema: &str, table: &str, name: &str, data_type: &str) {
        let ordinal = self.columns
                          .iter()
                          .filter(|c| c.schema.as_deref() == Some(schema) && c.table == table)
                          .count() as i32
                      + 1;
        self.columns.push(ColumnRow { catalog: self.catalog.clone(),
                                      schema: Some(schema.to_string()),
                                      table: table.to_string(),
                                      name: name.to_string(),
                                      data_type: data_type.to_string(),
                                      ordinal,
                                      nullable: true });
    }

    pub fn drop_table(&mut self, schema: &str, name: &str) {
        self.tables.retain(|t| !(t.schema.as_deref() == Some(schema) && t.name == name));
        self.columns.retain(|c| !(c.schema.as_deref() == Some(schema) && c.table == name));
    }
}

/// Fallos a inyectar. `None` = la etapa funciona.
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub acquire: Option<ConnectionError>,
    pub catalog: Option<CatalogError>,
    pub scalar: Option<CatalogError>,
    pub metadata: Option<CatalogError>,
}

#[derive(Debug, Default)]
struct Shared {
    catalog: Mutex<InMemoryCatalog>,
    failures: Mutex<Failures>,
    outstanding: AtomicUsize,
    checkouts: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fuente de conexiones en memoria. Clonable; los clones comparten estado.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    shared: Arc<Shared>,
}

impl InMemorySource {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        Self { shared: Arc::new(Shared { catalog: Mutex::new(catalog), ..Default::default() }) }
    }

    /// Modifica el catálogo (p.ej. simular DDL aplicado entre sondas).
    pub fn with_catalog_mut<R>(&self, f: impl FnOnce(&mut InMemoryCatalog) -> R) -> R {
        f(&mut lock(&self.shared.catalog))
    }

    pub fn set_failures(&self, failures: Failures) {
        *lock(&self.shared.failures) = failures;
    }

    /// Handles entregados y aún no liberados.
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::SeqCst)
    }

    /// Total de checkouts exitosos desde la creación.
    pub fn checkouts(&self) -> usize {
        self.shared.checkouts.load(Ordering::SeqCst)
    }
}

impl ConnectionSource for InMemorySource {
    type Conn = InMemoryConnection;

    fn acquire(&self) -> Result<InMemoryConnection, ConnectionError> {
        if let Some(e) = lock(&self.shared.failures).acquire.clone() {
            return Err(e);
        }
        self.shared.outstanding.fetch_add(1, Ordering::SeqCst);
        self.shared.checkouts.fetch_add(1, Ordering::SeqCst);
        Ok(InMemoryConnection { shared: Arc::clone(&self.shared) })
    }
}

/// Handle exclusivo sobre el catálogo en memoria. Se libera en `Drop`.
#[derive(Debug)]
pub struct InMemoryConnection {
    shared: Arc<Shared>,
}

impl InMemoryConnection {
    fn failure(&self, pick: impl FnOnce(&Failures) -> Option<CatalogError>) -> Result<(), CatalogError> {
        let failures = lock(&self.shared.failures);
        match pick(&*failures) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for InMemoryConnection {
    fn drop(&mut self) {
        self.shared.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

fn matches_table(filter: &TableFilter<'_>, catalog: Option<&str>, schema: Option<&str>, name: &str) -> bool {
    filter.catalog.map_or(true, |c| catalog == Some(c))
    && filter.schema.map_or(true, |s| schema == Some(s))
    && filter.table == name
}

impl CatalogConnection for InMemoryConnection {
    fn catalog(&mut self) -> Result<Option<String>, CatalogError> {
        self.failure(|f| f.catalog.clone())?;
        Ok(lock(&self.shared.catalog).catalog.clone())
    }

    fn query_scalar(&mut self, sql: &str) -> Result<Option<String>, CatalogError> {
        self.failure(|f| f.scalar.clone())?;
        lock(&self.shared.catalog).scalars
                                  .get(sql.trim())
                                  .cloned()
                                  .ok_or_else(|| CatalogError::Rejected(format!("unsupported statement: {sql}")))
    }

    fn tables(&mut self, filter: &TableFilter<'_>) -> Result<Vec<TableRow>, CatalogError> {
        self.failure(|f| f.metadata.clone())?;
        let catalog = lock(&self.shared.catalog);
        Ok(catalog.tables
                  .iter()
                  .filter(|t| matches_table(filter, t.catalog.as_deref(), t.schema.as_deref(), &t.name))
                  .cloned()
                  .collect())
    }

    fn columns(&mut self, filter: &ColumnFilter<'_>) -> Result<Vec<ColumnRow>, CatalogError> {
        self.failure(|f| f.metadata.clone())?;
        let catalog = lock(&self.shared.catalog);
        Ok(catalog.columns
                  .iter()
                  .filter(|c| {
                      matches_table(&filter.table, c.catalog.as_deref(), c.schema.as_deref(), &c.table)
                      && c.name == filter.column
                  })
                  .cloned()
                  .collect())
    }
}
