//! Sondas contra un Postgres real (requiere DATABASE_URL; si no, se omiten).
//!
//! Verifica:
//! - Presencia de tabla/columna recién creadas y ausencia de inexistentes.
//! - Idempotencia de llamadas repetidas.
//! - Plegado de mayúsculas de Postgres (identificadores no citados).
//! - El pool 1x1 queda sin checkouts tras cada sonda.
//! - Una tabla sin grants para el rol conectado sigue existiendo.


use diesel::connection::SimpleConnection;
use probe_core::{CatalogConnection, CatalogError, ConnectionSource, UpgradeDao};
use probe_persistence::{PgPool, PgUpgradeDao, PoolProvider};
use test_support::{build_pool_as_role, unique_table, with_pool};

fn dao(pool: &PgPool) -> PgUpgradeDao {
    PgUpgradeDao::new(PoolProvider::new(pool.clone()))
}

fn exec(pool: &PgPool, sql: &str) {
    let mut conn = pool.get().expect("conn");
    conn.batch_execute(sql).expect("ddl");
}

fn assert_pool_idle(pool: &PgPool) {
    let state = pool.state();
    assert_eq!(state.idle_connections, state.connections, "a probe left a connection checked out");
}

#[test]
fn resolves_current_schema() {
    let ran = with_pool(|pool| {
        let dao = dao(pool);
        let schema = dao.resolve_current_schema();
        assert!(!schema.is_empty(), "current_schema() should resolve on a default search_path");
        assert_eq!(dao.try_resolve_current_schema().expect("strict"), schema);
        assert_pool_idle(pool);
    });
    if ran.is_none() {
        eprintln!("DATABASE_URL not set - skipping");
    }
}

#[test]
fn table_and_column_presence() {
    let ran = with_pool(|pool| {
        let table = unique_table("orders");
        exec(pool, &format!("CREATE TABLE {table} (id BIGINT PRIMARY KEY, note TEXT)"));
        let dao = dao(pool);

        assert!(dao.table_exists(&table).expect("probe"));
        assert_pool_idle(pool);
        assert!(!dao.table_exists("nonexistent_tbl_x").expect("probe"));
        assert!(dao.column_exists(&table, "id").expect("probe"));
        assert!(!dao.column_exists(&table, "missing_col").expect("probe"));
        assert_pool_idle(pool);

        let cols = dao.find_columns(&table, "note").expect("probe");
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].data_type, "text");
        assert_eq!(cols[0].ordinal, 2);
        assert!(cols[0].nullable);

        exec(pool, &format!("DROP TABLE {table}"));
        assert!(!dao.table_exists(&table).expect("probe"));
    });
    if ran.is_none() {
        eprintln!("DATABASE_URL not set - skipping");
    }
}

#[test]
fn repeated_probes_agree() {
    let ran = with_pool(|pool| {
        let table = unique_table("idem");
        exec(pool, &format!("CREATE TABLE {table} (id INT)"));
        let dao = dao(pool);
        for _ in 0..3 {
            assert!(dao.table_exists(&table).expect("probe"));
            assert!(!dao.table_exists("nonexistent_tbl_x").expect("probe"));
        }
        exec(pool, &format!("DROP TABLE {table}"));
        assert_pool_idle(pool);
    });
    if ran.is_none() {
        eprintln!("DATABASE_URL not set - skipping");
    }
}

#[test]
fn unquoted_identifiers_fold_to_lower_case() {
    let ran = with_pool(|pool| {
        let base = unique_table("case");
        let mixed = format!("Mixed_{base}");
        // sin comillas Postgres guarda `mixed_...`; citado conserva el nombre
        exec(pool, &format!("CREATE TABLE {mixed} (id INT)"));
        exec(pool, &format!("CREATE TABLE \"Quoted_{base}\" (\"Id\" INT)"));
        let dao = dao(pool);

        assert!(dao.table_exists(&mixed.to_lowercase()).expect("probe"));
        assert!(!dao.table_exists(&mixed).expect("probe"));
        assert!(dao.table_exists(&format!("Quoted_{base}")).expect("probe"));
        assert!(!dao.table_exists(&format!("quoted_{base}")).expect("probe"));
        assert!(dao.column_exists(&format!("Quoted_{base}"), "Id").expect("probe"));
        assert!(!dao.column_exists(&format!("Quoted_{base}"), "id").expect("probe"));

        exec(pool, &format!("DROP TABLE {mixed}; DROP TABLE \"Quoted_{base}\""));
    });
    if ran.is_none() {
        eprintln!("DATABASE_URL not set - skipping");
    }
}

#[test]
fn failing_scalar_query_is_rejected() {
    let ran = with_pool(|pool| {
        let provider = PoolProvider::new(pool.clone());
        {
            let mut conn = provider.acquire().expect("acquire");
            let err = conn.query_scalar("select missing_column_xyz from missing_relation_xyz").unwrap_err();
            assert!(matches!(err, CatalogError::Rejected(_)), "unexpected {err:?}");
            // la conexión sigue usable tras el error
            assert!(conn.catalog().expect("catalog").is_some());
        }
        assert_pool_idle(pool);
    });
    if ran.is_none() {
        eprintln!("DATABASE_URL not set - skipping");
    }
}

#[test]
fn table_without_grants_still_exists() {
    let ran = with_pool(|pool| {
        let table = unique_table("restricted");
        let role = unique_table("limited");
        let mut admin = pool.get().expect("conn");
        if let Err(e) = admin.batch_execute(&format!("CREATE ROLE {role} NOLOGIN")) {
            eprintln!("cannot create role ({e}) - skipping");
            return;
        }
        // en PG16+ el creador no puede SET ROLE sin un grant explícito
        let _ = admin.batch_execute(&format!("GRANT {role} TO CURRENT_USER"));
        admin.batch_execute(&format!("CREATE TABLE {table} (id INT, secret TEXT); REVOKE ALL ON {table} FROM PUBLIC"))
             .expect("ddl");
        drop(admin);

        if let Some(limited) = build_pool_as_role(&role) {
            let dao = dao(&limited);
            assert!(dao.table_exists(&table).expect("lookup as limited role"));
            assert!(dao.column_exists(&table, "secret").expect("lookup as limited role"));
            assert!(!dao.column_exists(&table, "missing_col").expect("lookup as limited role"));
            assert_pool_idle(&limited);
        }

        exec(pool, &format!("DROP TABLE {table}; DROP ROLE {role}"));
    });
    if ran.is_none() {
        eprintln!("DATABASE_URL not set - skipping");
    }
}
