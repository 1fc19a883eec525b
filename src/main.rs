use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;
use upgrade_probe::{build_upgrade_dao, AppConfig, AppError, ColumnRow, GuardedStep, Precondition, StepDecision, TableRow,
                    UpgradeDao};

/// Sondas de schema para el driver de upgrades.
///
/// Códigos de salida: 0 presente / aplicar, 1 ausente / saltar, 2 uso
/// inválido, 5 error.
#[derive(Parser, Debug)]
#[command(name = "upgrade-probe", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dialecto, raíz de scripts y schema actual.
    Info,
    /// Schema actual de la conexión ("" si no pudo resolverse).
    Schema,
    /// ¿Existe la tabla en el schema actual? Lista las filas encontradas.
    Table {
        name: String,
        /// Imprime las filas como JSON.
        #[arg(long)]
        json: bool,
    },
    /// ¿Existe la columna en la tabla? Lista las filas encontradas.
    Column {
        table: String,
        column: String,
        #[arg(long)]
        json: bool,
    },
    /// Decide si un paso DDL se aplica según sus precondiciones.
    Guard {
        /// Nombre del paso (solo para logs).
        #[arg(long, default_value = "step")]
        name: String,
        #[arg(long = "table-absent")]
        table_absent: Vec<String>,
        #[arg(long = "table-present")]
        table_present: Vec<String>,
        /// Formato `tabla.columna`, sin calificar por schema.
        #[arg(long = "column-absent")]
        column_absent: Vec<ColumnRef>,
        /// Formato `tabla.columna`, sin calificar por schema.
        #[arg(long = "column-present")]
        column_present: Vec<ColumnRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnRef {
    table: String,
    column: String,
}

impl FromStr for ColumnRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // las sondas buscan en el schema actual; `schema.tabla.columna` no se admite
        match s.split_once('.') {
            Some((table, column)) if !table.is_empty() && !column.is_empty() && !column.contains('.') => {
                Ok(ColumnRef { table: table.to_string(), column: column.to_string() })
            }
            _ => Err(format!("expected <table>.<column> with unqualified names, got {s:?}")),
        }
    }
}

fn qualified(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) if !schema.is_empty() => format!("{schema}.{name}"),
        _ => name.to_string(),
    }
}

fn table_line(row: &TableRow) -> String {
    format!("{} ({})", qualified(row.schema.as_deref(), &row.name), row.table_type)
}

fn column_line(row: &ColumnRow) -> String {
    let nullability = if row.nullable { "null" } else { "not null" };
    format!("{}.{} {} {} #{}",
            qualified(row.schema.as_deref(), &row.table),
            row.name,
            row.data_type,
            nullability,
            row.ordinal)
}

/// Salida de `table`/`column`: una línea por fila (o JSON) y el veredicto.
fn render_rows<T: Serialize>(rows: &[T], json: bool, line: fn(&T) -> String) -> Result<Vec<String>, AppError> {
    if json {
        return Ok(vec![serde_json::to_string(rows)?]);
    }
    let mut out: Vec<String> = rows.iter().map(line).collect();
    out.push(if rows.is_empty() { "absent" } else { "present" }.to_string());
    Ok(out)
}

fn presence(lines: Vec<String>, found: bool) -> ExitCode {
    for line in lines {
        println!("{line}");
    }
    if found { ExitCode::SUCCESS } else { ExitCode::from(1) }
}

fn guard_step(name: String,
              table_absent: Vec<String>,
              table_present: Vec<String>,
              column_absent: Vec<ColumnRef>,
              column_present: Vec<ColumnRef>)
              -> GuardedStep {
    let mut step = GuardedStep::new(name);
    for t in table_absent {
        step = step.require(Precondition::table_absent(t));
    }
    for t in table_present {
        step = step.require(Precondition::table_present(t));
    }
    for c in column_absent {
        step = step.require(Precondition::column_absent(c.table, c.column));
    }
    for c in column_present {
        step = step.require(Precondition::column_present(c.table, c.column));
    }
    step
}

fn run(command: Command, dao: &dyn UpgradeDao) -> Result<ExitCode, AppError> {
    match command {
        Command::Info => {
            println!("dialect: {}", dao.dialect());
            println!("script_root: {}", dao.script_root_path());
            println!("schema: {}", dao.resolve_current_schema());
            Ok(ExitCode::SUCCESS)
        }
        Command::Schema => {
            println!("{}", dao.resolve_current_schema());
            Ok(ExitCode::SUCCESS)
        }
        Command::Table { name, json } => {
            let rows = dao.find_tables(&name)?;
            Ok(presence(render_rows(&rows, json, table_line)?, !rows.is_empty()))
        }
        Command::Column { table, column, json } => {
            let rows = dao.find_columns(&table, &column)?;
            Ok(presence(render_rows(&rows, json, column_line)?, !rows.is_empty()))
        }
        Command::Guard { name, table_absent, table_present, column_absent, column_present } => {
            let step = guard_step(name, table_absent, table_present, column_absent, column_present);
            match step.decide(dao)? {
                StepDecision::Apply => {
                    println!("apply");
                    Ok(ExitCode::SUCCESS)
                }
                StepDecision::Skip(unmet) => {
                    println!("skip: {unmet}");
                    Ok(ExitCode::from(1))
                }
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = AppConfig::from_env().and_then(|cfg| build_upgrade_dao(&cfg))
                                      .and_then(|dao| run(cli.command, dao.as_ref()));
    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("[upgrade-probe] {e}");
            ExitCode::from(5)
        }
    }
}
