//! Guardas de pasos DDL: decide si un paso de upgrade se aplica o se salta
//! según la existencia de tablas/columnas.
//!
//! Un error de sonda se propaga tal cual; nunca se decide `Skip` ante un
//! estado desconocido.

use std::fmt;

use log::{debug, info};

use crate::errors::ProbeError;
use crate::upgrade::UpgradeDao;

/// Condición que debe cumplirse para aplicar un paso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    TableAbsent(String),
    TablePresent(String),
    ColumnAbsent { table: String, column: String },
    ColumnPresent { table: String, column: String },
}

impl Precondition {
    pub fn table_absent(table: impl Into<String>) -> Self {
        Precondition::TableAbsent(table.into())
    }

    pub fn table_present(table: impl Into<String>) -> Self {
        Precondition::TablePresent(table.into())
    }

    pub fn column_absent(table: impl Into<String>, column: impl Into<String>) -> Self {
        Precondition::ColumnAbsent { table: table.into(), column: column.into() }
    }

    pub fn column_present(table: impl Into<String>, column: impl Into<String>) -> Self {
        Precondition::ColumnPresent { table: table.into(), column: column.into() }
    }

    /// Evalúa la condición contra la base.
    pub fn holds(&self, dao: &dyn UpgradeDao) -> Result<bool, ProbeError> {
        match self {
            Precondition::TableAbsent(t) => dao.table_exists(t).map(|found| !found),
            Precondition::TablePresent(t) => dao.table_exists(t),
            Precondition::ColumnAbsent { table, column } => dao.column_exists(table, column).map(|found| !found),
            Precondition::ColumnPresent { table, column } => dao.column_exists(table, column),
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::TableAbsent(t) => write!(f, "table {t} absent"),
            Precondition::TablePresent(t) => write!(f, "table {t} present"),
            Precondition::ColumnAbsent { table, column } => write!(f, "column {table}.{column} absent"),
            Precondition::ColumnPresent { table, column } => write!(f, "column {table}.{column} present"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDecision {
    Apply,
    /// Se salta porque esta condición no se cumple.
    Skip(Precondition),
}

/// Paso de upgrade con sus precondiciones (todas deben cumplirse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedStep {
    pub name: String,
    pub preconditions: Vec<Precondition>,
}

impl GuardedStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), preconditions: Vec::new() }
    }

    pub fn require(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    /// Evalúa las precondiciones en orden; corta en la primera que no se
    /// cumple o en el primer error.
    pub fn decide(&self, dao: &dyn UpgradeDao) -> Result<StepDecision, ProbeError> {
        for pre in &self.preconditions {
            debug!("guard:check step={} pre={pre}", self.name);
            if !pre.holds(dao)? {
                info!("guard:skip step={} unmet={pre}", self.name);
                return Ok(StepDecision::Skip(pre.clone()));
            }
        }
        info!("guard:apply step={}", self.name);
        Ok(StepDecision::Apply)
    }
}
