//! Propiedades del contrato de sondas contra el backend en memoria.
//!
//! Verifica:
//! - Idempotencia y corrección de presencia (`orders`/`id`).
//! - Fallback de resolución de schema ante error del driver.
//! - Escalamiento de errores de metadata (nunca `false`).
//! - Higiene de recursos: cero handles pendientes tras cada llamada.

use std::sync::Arc;
use std::thread;

use probe_core::memory::Failures;
use probe_core::{CatalogError, ConnectionError, InMemoryCatalog, InMemorySource, PostgresqlUpgradeDao, ProbeError,
                 UpgradeDao, POSTGRES_CURRENT_SCHEMA};

fn orders_db() -> PostgresqlUpgradeDao<InMemorySource> {
    let mut cat = InMemoryCatalog::new(Some("appdb")).with_scalar(POSTGRES_CURRENT_SCHEMA, Some("public"));
    cat.create_table("public", "orders");
    cat.add_column("public", "orders", "id", "integer");
    PostgresqlUpgradeDao::new(InMemorySource::new(cat))
}

fn assert_clean(dao: &PostgresqlUpgradeDao<InMemorySource>) {
    assert_eq!(dao.source().outstanding(), 0, "no handle may outlive a probe call");
}

#[test]
fn presence_correctness() {
    let dao = orders_db();
    assert!(dao.table_exists("orders").unwrap());
    assert_clean(&dao);
    assert!(!dao.table_exists("nonexistent_tbl_x").unwrap());
    assert_clean(&dao);
    assert!(dao.column_exists("orders", "id").unwrap());
    assert_clean(&dao);
    assert!(!dao.column_exists("orders", "missing_col").unwrap());
    assert_clean(&dao);
}

#[test]
fn repeated_probes_are_idempotent() {
    let dao = orders_db();
    for name in ["orders", "nonexistent_tbl_x"] {
        let first = dao.table_exists(name).unwrap();
        let second = dao.table_exists(name).unwrap();
        assert_eq!(first, second, "table_exists({name}) changed between calls");
    }
    assert_clean(&dao);
}

#[test]
fn probes_observe_ddl_between_calls() {
    let dao = orders_db();
    assert!(!dao.column_exists("orders", "total").unwrap());
    dao.source().with_catalog_mut(|c| c.add_column("public", "orders", "total", "numeric"));
    assert!(dao.column_exists("orders", "total").unwrap());
    dao.source().with_catalog_mut(|c| c.drop_table("public", "orders"));
    assert!(!dao.table_exists("orders").unwrap());
    assert!(!dao.column_exists("orders", "id").unwrap());
}

#[test]
fn schema_resolution_falls_back_to_empty() {
    let dao = orders_db();
    dao.source().set_failures(Failures { scalar: Some(CatalogError::Rejected("simulated driver error".into())),
                                         ..Default::default() });
    assert_eq!(dao.resolve_current_schema(), "");
    assert_clean(&dao);
    // sin schema, la búsqueda no calificada sigue encontrando la tabla
    assert!(dao.table_exists("orders").unwrap());
    assert_clean(&dao);
}

#[test]
fn metadata_failure_raises_probe_error() {
    let dao = orders_db();
    dao.source().set_failures(Failures { metadata: Some(CatalogError::Interrupted("connection reset".into())),
                                         ..Default::default() });
    match dao.table_exists("orders") {
        Err(ProbeError::Table { table, source }) => {
            assert_eq!(table, "orders");
            assert!(source.is_transient());
        }
        other => panic!("expected ProbeError::Table, got {other:?}"),
    }
    assert_clean(&dao);
    match dao.column_exists("orders", "id") {
        Err(ProbeError::Column { table, column, .. }) => assert_eq!((table.as_str(), column.as_str()), ("orders", "id")),
        other => panic!("expected ProbeError::Column, got {other:?}"),
    }
    assert_clean(&dao);
}

#[test]
fn connection_failure_raises_probe_error() {
    let dao = orders_db();
    dao.source().set_failures(Failures { acquire: Some(ConnectionError::transient("pool timed out")), ..Default::default() });
    assert!(matches!(dao.table_exists("orders"), Err(ProbeError::Connection(_))));
    assert!(matches!(dao.column_exists("orders", "id"), Err(ProbeError::Connection(_))));
    assert_eq!(dao.resolve_current_schema(), "");
    assert_clean(&dao);
}

#[test]
fn table_names_match_exactly() {
    // El catálogo guarda el nombre tal cual; la comparación es exacta.
    let dao = orders_db();
    assert!(dao.table_exists("orders").unwrap());
    assert!(!dao.table_exists("Orders").unwrap());
    assert!(!dao.table_exists("order_").unwrap());
}

#[test]
fn probes_from_many_threads() {
    let dao = Arc::new(orders_db());
    let handles: Vec<_> = (0..8).map(|_| {
                                    let dao = Arc::clone(&dao);
                                    thread::spawn(move || dao.table_exists("orders").unwrap())
                                })
                                .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
    assert_eq!(dao.source().checkouts(), 8);
    assert_clean(&dao);
}
