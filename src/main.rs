use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use schooladmin::application::payments::PaymentService;
use schooladmin::domain::payment::TransitionPolicy;
use schooladmin::domain::ports::DocumentStoreRef;
use schooladmin::infrastructure::in_memory::InMemoryDocumentStore;
use schooladmin::interfaces::csv::payment_writer::PaymentWriter;
use schooladmin::interfaces::csv::roster_reader::{RosterReader, import_roster};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "SCHOOLADMIN_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Parent/student roster CSV to import before running the command
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    /// Whether a decided payment may be decided again
    #[arg(
        long,
        env = "SCHOOLADMIN_TRANSITION_POLICY",
        default_value = "allow-retransition",
        global = true
    )]
    transition_policy: TransitionPolicy,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review and decide fee payments
    #[command(subcommand)]
    Payments(PaymentsCommand),
}

#[derive(Subcommand)]
enum PaymentsCommand {
    /// Print every submitted payment as CSV
    List,
    /// Mark a payment attempt as paid
    Approve {
        student_id: String,
        transaction_id: String,
    },
    /// Mark a payment attempt as rejected
    Reject {
        student_id: String,
        transaction_id: String,
    },
    /// Print the first record found for a student
    Find { student_id: String },
}

fn open_store(db_path: Option<PathBuf>) -> Result<DocumentStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = schooladmin::infrastructure::rocksdb::RocksDBStore::open(path)
                .into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        None => Ok(Arc::new(InMemoryDocumentStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.db_path)?;

    if let Some(roster) = cli.roster {
        let file = File::open(&roster).into_diagnostic()?;
        let parents = import_roster(store.as_ref(), RosterReader::new(file))
            .await
            .into_diagnostic()?;
        info!(parents, roster = %roster.display(), "Roster imported");
    }

    let payments = PaymentService::with_policy(store, cli.transition_policy);

    match cli.command {
        Command::Payments(PaymentsCommand::List) => {
            let listing = payments.list_payments().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = PaymentWriter::new(stdout.lock());
            writer.write_payments(&listing).into_diagnostic()?;
        }
        Command::Payments(PaymentsCommand::Approve {
            student_id,
            transaction_id,
        }) => {
            let change = payments
                .approve_payment(&student_id, &transaction_id)
                .await
                .into_diagnostic()?;
            println!("{}", change.message);
        }
        Command::Payments(PaymentsCommand::Reject {
            student_id,
            transaction_id,
        }) => {
            let change = payments
                .reject_payment(&student_id, &transaction_id)
                .await
                .into_diagnostic()?;
            println!("{}", change.message);
        }
        Command::Payments(PaymentsCommand::Find { student_id }) => {
            match payments.find_student(&student_id).await.into_diagnostic()? {
                Some(record) => {
                    let json = serde_json::to_string_pretty(&record).into_diagnostic()?;
                    println!("{json}");
                }
                None => println!("not found"),
            }
        }
    }

    Ok(())
}
