//! oxide-ora CLI
//!
//! Offline tool printing the Oracle SQL the adapter generates.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_ora::migrator::{create_sequence_statements, create_table_statements};
use oxide_ora::Config;
use oxide_ora_core::clause::{Assignment, Clause, Insert, OnConflict, Returning, Values};
use oxide_ora_core::statement::CREATE_CLAUSES;
use oxide_ora_core::{
    BindVar, DataType, Dialect, Field, OracleDialect, Schema, Shape, SqlValue, Statement,
};

/// Oracle dialect SQL generation.
#[derive(Parser)]
#[command(name = "oxide-ora")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Adapter configuration file (JSON).
    #[arg(short, long, env = "ORACLE_ADAPTER_CONFIG")]
    config: Option<PathBuf>,

    /// Server banner to assume, e.g. "Oracle Database 19c".
    #[arg(short, long)]
    server_version: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL and bound variables of an insert.
    Render {
        /// Insert plan: schema, rows and options (JSON).
        #[arg(short, long)]
        plan: PathBuf,
    },

    /// Print the DDL of a table.
    Ddl {
        /// Table schema (JSON).
        #[arg(short, long)]
        schema: PathBuf,
    },
}

/// An insert to render.
#[derive(Deserialize)]
struct Plan {
    schema: Schema,
    rows: Vec<serde_json::Map<String, Value>>,
    /// Treat the rows as a slice even when there is only one.
    #[serde(default)]
    batch: Option<bool>,
    #[serde(default)]
    returning: Option<Vec<String>>,
    #[serde(default)]
    on_conflict: Option<ConflictPlan>,
}

#[derive(Deserialize)]
struct ConflictPlan {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    do_nothing: bool,
    #[serde(default)]
    update_all: bool,
    /// Columns updated from the incoming row.
    #[serde(default)]
    update: Vec<String>,
}

impl From<ConflictPlan> for OnConflict {
    fn from(plan: ConflictPlan) -> Self {
        Self {
            columns: plan.columns,
            do_nothing: plan.do_nothing,
            update_all: plan.update_all,
            do_updates: plan.update.into_iter().map(Assignment::excluded).collect(),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

/// Converts a JSON cell to the value bound for `field`.
fn cell_value(field: &Field, value: &Value) -> anyhow::Result<SqlValue> {
    Ok(match (value, &field.data_type) {
        (Value::Null, _) => SqlValue::Null,
        (Value::Bool(b), _) => SqlValue::Bool(*b),
        (Value::Number(n), DataType::Float) => SqlValue::Float(n.as_f64().unwrap_or_default()),
        (Value::Number(n), _) => match n.as_i64() {
            Some(i) => SqlValue::Int(i),
            None => SqlValue::Float(n.as_f64().unwrap_or_default()),
        },
        (Value::String(s), DataType::Time) => SqlValue::Timestamp(
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .with_context(|| format!("column {}: invalid timestamp {s:?}", field.db_name))?,
        ),
        (Value::String(s), DataType::Bytes) => SqlValue::Blob(s.clone().into_bytes()),
        (Value::String(s), _) => SqlValue::Text(s.clone()),
        (other, _) => bail!("column {}: unsupported value {other}", field.db_name),
    })
}

/// Builds the column list and value matrix of a plan.
fn plan_values(plan: &Plan) -> anyhow::Result<Values> {
    for row in &plan.rows {
        if let Some(unknown) = row.keys().find(|key| plan.schema.lookup(key).is_none()) {
            bail!("table {} has no column {unknown}", plan.schema.table());
        }
    }
    let fields: Vec<&Field> = plan
        .schema
        .fields()
        .iter()
        .filter(|field| plan.rows.iter().any(|row| row.contains_key(&field.db_name)))
        .collect();

    let mut rows = Vec::with_capacity(plan.rows.len());
    for row in &plan.rows {
        let cells = fields
            .iter()
            .map(|field| {
                let value = row.get(&field.db_name).unwrap_or(&Value::Null);
                cell_value(field, value).map(BindVar::In)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        rows.push(cells);
    }
    let columns = fields.iter().map(|field| field.db_name.clone()).collect();
    Ok(Values::new(columns, rows))
}

fn render(dialect: &OracleDialect, plan: Plan) -> anyhow::Result<()> {
    let values = plan_values(&plan)?;
    let batch = plan.batch.unwrap_or(plan.rows.len() > 1);
    let shape = if batch {
        Shape::Batch {
            rows: plan.rows.len(),
        }
    } else {
        Shape::Single
    };

    let mut stmt = Statement::new(&plan.schema, shape);
    stmt.add_clause(Clause::Insert(Insert::default()));
    stmt.add_clause(Clause::Values(values));
    if let Some(conflict) = plan.on_conflict {
        stmt.add_clause(Clause::OnConflict(conflict.into()));
    }
    if let Some(columns) = plan.returning {
        stmt.add_clause(Clause::Returning(Returning::columns(columns)));
    }
    stmt.build(dialect, CREATE_CLAUSES)?;
    let (sql, vars) = stmt.into_parts();
    debug!(vars = vars.len(), "rendered insert");

    println!("{sql}");
    println!("{:-<60}", "");
    for (i, var) in vars.iter().enumerate() {
        match var {
            BindVar::In(value) => println!(" {:>3}  IN  {}", i + 1, value.to_sql_inline()),
            BindVar::Out(slot) => {
                println!(" {:>3}  OUT row {} field {}", i + 1, slot.row, slot.field);
            }
        }
    }
    println!("{:-<60}", "");
    println!("{}", dialect.explain(&sql, &vars));
    Ok(())
}

fn ddl(dialect: &OracleDialect, config: &Config, schema: &Schema) {
    let statements = create_sequence_statements(dialect, schema)
        .into_iter()
        .chain(create_table_statements(dialect, config, schema));
    for sql in statements {
        println!("{sql};");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(banner) = &cli.server_version {
        config.apply_server_version(banner);
    }
    let dialect = OracleDialect::new(config.dialect.clone());
    info!(
        returning = config.dialect.support_returning,
        offset_fetch = config.dialect.support_offset_fetch,
        "oracle dialect ready"
    );

    match cli.command {
        Commands::Render { plan } => render(&dialect, read_json(&plan)?)?,
        Commands::Ddl { schema } => ddl(&dialect, &config, &read_json(&schema)?),
    }

    Ok(())
}
