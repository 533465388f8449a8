//! colspec-migrate CLI
//!
//! Command-line tool for computing table migrations from snapshot files.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use colspec_migrate::prelude::*;

/// Column-spec driven PostgreSQL migrations.
#[derive(Parser)]
#[command(name = "colspec-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the statements that migrate a table from one snapshot to another.
    Diff {
        /// Table name, optionally schema-qualified.
        #[arg(short, long, env = "COLSPEC_TABLE")]
        table: String,

        /// Current snapshot file.
        #[arg(short, long)]
        new: PathBuf,

        /// Baseline snapshot file. Bootstraps with CREATE TABLE when
        /// missing.
        #[arg(short, long)]
        old: Option<PathBuf>,

        /// Never drop columns.
        #[arg(long, env = "COLSPEC_SAFE")]
        safe: bool,

        /// How clause keywords are located in column specs.
        #[arg(long, value_enum, default_value_t = Matching::Substring)]
        keyword_matching: Matching,

        /// Write the current snapshot here as the next baseline.
        #[arg(long)]
        baseline_out: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Sql)]
        format: Format,
    },

    /// Print the CREATE TABLE statement for a snapshot.
    Create {
        /// Table name, optionally schema-qualified.
        #[arg(short, long, env = "COLSPEC_TABLE")]
        table: String,

        /// Snapshot file.
        #[arg(short, long)]
        new: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Matching {
    Substring,
    WordBoundary,
}

impl From<Matching> for KeywordMatching {
    fn from(matching: Matching) -> Self {
        match matching {
            Matching::Substring => Self::Substring,
            Matching::WordBoundary => Self::WordBoundary,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Sql,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for SQL.
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

    let dialect = PostgresDialect::new();

    match cli.command {
        Commands::Diff {
            table,
            new,
            old,
            safe,
            keyword_matching,
            baseline_out,
            format,
        } => {
            let new_snapshot = Snapshot::load(&new)?;
            let old_snapshot = load_baseline(old.as_deref())?;

            let mut options = MigratorOptions::new().with_keyword_matching(keyword_matching.into());
            if safe {
                options = options.safe();
            }
            let migration =
                Migrator::with_options(options).migrate(&table, old_snapshot.as_ref(), &new_snapshot)?;

            for op in &migration.operations {
                if op.is_destructive() {
                    warn!("{}", op.description());
                } else {
                    debug!("{}", op.description());
                }
            }

            match format {
                Format::Sql => print_sql(&migration.to_sql(&dialect)),
                Format::Json => println!("{}", serde_json::to_string_pretty(&migration.operations)?),
            }

            if migration.is_empty() {
                info!("No changes detected for {table}.");
            }

            if let Some(path) = baseline_out {
                migration.snapshot.save(&path)?;
                info!("Wrote baseline: {}", path.display());
            }
        }

        Commands::Create { table, new } => {
            let snapshot = Snapshot::load(&new)?;
            let op = Migrator::create_table(&table, &snapshot);
            print_sql(&[dialect.generate_sql(&op)]);
        }
    }

    Ok(())
}

fn load_baseline(path: Option<&Path>) -> anyhow::Result<Option<Snapshot>> {
    match path {
        Some(path) if path.exists() => Ok(Some(Snapshot::load(path)?)),
        Some(path) => {
            info!("Baseline {} not found, creating table.", path.display());
            Ok(None)
        }
        None => Ok(None),
    }
}

fn print_sql(statements: &[String]) {
    for statement in statements {
        println!("{statement};");
    }
}
