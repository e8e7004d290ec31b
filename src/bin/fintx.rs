//! # FinTx Operations CLI
//!
//! Command-line entrypoint for the monitor and the ledger operations.
//! Business rejections print a clean message and exit 1; fatal failures are
//! logged and exit 2. The library never terminates the process — only this
//! binary maps outcomes to exit codes.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use fintx_ops::classification::Classifier;
use fintx_ops::config::{ConfigManager, FinTxConfig};
use fintx_ops::database::{
    DatabaseConnection, OperationKind, SqlAccountSource, SqlErrorLogSource, SqlHealthCheckSource,
    SqlLedgerOperations,
};
use fintx_ops::error::Result;
use fintx_ops::monitor::{
    AuditLog, HtmlReportBuilder, Monitor, PlainReportBuilder, ReportBuilder, ReportDelivery,
    RuleBasedSummarizer, WebhookDelivery,
};
use fintx_ops::resilience::RetryPolicy;
use fintx_ops::watermark::SqliteWatermarkStore;
use fintx_ops::{OperationExecutor, OperationOutcome};

#[derive(Parser)]
#[command(name = "fintx")]
#[command(about = "Ledger monitoring and operations")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration directory (default: config)
    #[arg(short, long)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Plain,
    Html,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the error-log monitor
    Monitor {
        /// Keep cycling at the configured interval instead of running once
        #[arg(long = "loop")]
        run_loop: bool,

        /// Override the poll interval in seconds
        #[arg(long)]
        interval: Option<u64>,

        /// Deliver an explicit OK report on idle cycles
        #[arg(long)]
        send_when_idle: bool,

        /// Report format
        #[arg(long, value_enum, default_value = "html")]
        format: ReportFormat,
    },

    /// Deposit into an account
    Deposit {
        #[arg(long)]
        account: i64,
        #[arg(long)]
        amount: f64,
        /// Idempotency reference (generated when omitted)
        #[arg(long = "ref")]
        reference: Option<String>,
    },

    /// Withdraw from an account
    Withdraw {
        #[arg(long)]
        account: i64,
        #[arg(long)]
        amount: f64,
        #[arg(long = "ref")]
        reference: Option<String>,
    },

    /// Transfer between two accounts
    Transfer {
        #[arg(long)]
        from_id: i64,
        #[arg(long)]
        to_id: i64,
        #[arg(long)]
        amount: f64,
        #[arg(long = "ref")]
        reference: Option<String>,
    },

    /// List accounts with their balances
    ShowAccounts,

    /// Show the most recent error-log rows
    ShowErrors {
        #[arg(long, default_value = "20")]
        limit: i64,
    },

    /// Run the health probes once and print the findings
    HealthCheck,
}

/// Prints reports to stdout when no webhook endpoint is configured.
struct ConsoleDelivery;

#[async_trait]
impl ReportDelivery for ConsoleDelivery {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        println!("=== {subject} ===\n{body}");
        Ok(())
    }
}

fn build_delivery(config: &FinTxConfig) -> Arc<dyn ReportDelivery> {
    match &config.delivery.webhook_url {
        Some(url) => Arc::new(WebhookDelivery::new(
            url.clone(),
            config.delivery.recipients.clone(),
        )),
        None => Arc::new(ConsoleDelivery),
    }
}

fn build_report_builder(
    format: ReportFormat,
    classifier: Arc<Classifier>,
    subject_prefix: String,
) -> Arc<dyn ReportBuilder> {
    match format {
        ReportFormat::Plain => Arc::new(PlainReportBuilder::new(classifier, subject_prefix)),
        ReportFormat::Html => Arc::new(
            HtmlReportBuilder::new(classifier, subject_prefix)
                .with_summarizer(Arc::new(RuleBasedSummarizer)),
        ),
    }
}

async fn run_monitor(
    config: &FinTxConfig,
    run_loop: bool,
    interval: Option<u64>,
    send_when_idle: bool,
    format: ReportFormat,
) -> Result<()> {
    let connection = DatabaseConnection::connect(&config.database).await?;
    let pool = connection.pool().clone();

    let classifier = Arc::new(Classifier::new(&config.classification));
    let store = Arc::new(SqliteWatermarkStore::open(&config.monitor.state_path)?);
    let builder = build_report_builder(
        format,
        classifier,
        config.delivery.subject_prefix.clone(),
    );

    let mut monitor = Monitor::new(
        Arc::new(SqlErrorLogSource::new(pool.clone())),
        Arc::new(SqlHealthCheckSource::new(pool)),
        store,
        builder,
        build_delivery(config),
        config.monitor.watermark_key.clone(),
        send_when_idle || config.monitor.send_on_idle,
    );
    if let Some(path) = &config.monitor.audit_path {
        monitor = monitor.with_audit(AuditLog::new(path.clone()));
    }

    if run_loop {
        let seconds = interval.unwrap_or(config.monitor.poll_interval_seconds);
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping after current cycle");
                let _ = shutdown_tx.send(true);
            }
        });
        monitor
            .run_loop(Duration::from_secs(seconds), shutdown_rx)
            .await;
    } else {
        let cycle = monitor.run_cycle().await?;
        info!(
            new_errors = cycle.new_errors,
            findings = cycle.findings,
            delivered = cycle.delivered,
            watermark = cycle.watermark,
            "cycle complete"
        );
    }
    Ok(())
}

async fn run_operation(
    config: &FinTxConfig,
    kind: OperationKind,
    reference: Option<String>,
) -> i32 {
    let connection = match DatabaseConnection::connect(&config.database).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "database connection failed");
            return 2;
        }
    };

    let classifier = Arc::new(Classifier::new(&config.classification));
    let retry = Arc::new(RetryPolicy::new(classifier.clone(), &config.retry));
    let executor = OperationExecutor::new(
        Arc::new(SqlLedgerOperations::new(connection.pool().clone())),
        retry,
    );

    match executor.execute(kind, reference).await {
        OperationOutcome::Committed { reference } => {
            println!("committed (ref {reference})");
            0
        }
        OperationOutcome::Rejected { code, message, .. } => {
            let plan = classifier.classify(Some(code), "", &message);
            println!("rejected: {message}");
            println!("{}", plan.remediation);
            1
        }
        OperationOutcome::Failed {
            code,
            attempts,
            message,
            ..
        } => {
            error!(code, attempts, error = %message, "operation failed");
            2
        }
    }
}

async fn show_accounts(config: &FinTxConfig) -> Result<()> {
    let connection = DatabaseConnection::connect(&config.database).await?;
    let source = SqlAccountSource::new(connection.pool().clone());

    println!("Accounts:");
    for account in source.fetch_accounts().await? {
        println!("  {}", account.summary_line());
    }
    Ok(())
}

async fn show_errors(config: &FinTxConfig, limit: i64) -> Result<()> {
    let connection = DatabaseConnection::connect(&config.database).await?;
    let source = SqlErrorLogSource::new(connection.pool().clone());
    let classifier = Classifier::new(&config.classification);

    for record in source.fetch_recent(limit).await? {
        let plan = classifier.classify(
            Some(record.error_number),
            &record.proc_name,
            &record.error_message,
        );
        println!("{} [{}]", record.summary_line(), plan.severity);
    }
    Ok(())
}

async fn health_check(config: &FinTxConfig) -> Result<()> {
    use fintx_ops::database::HealthCheckSource;

    let connection = DatabaseConnection::connect(&config.database).await?;
    let source = SqlHealthCheckSource::new(connection.pool().clone());
    let findings = source.run_health_check().await?;
    if findings.is_empty() {
        println!("HealthCheck: OK");
    } else {
        for finding in &findings {
            println!("{}", finding.summary_line());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    fintx_ops::logging::init_structured_logging();
    let cli = Cli::parse();

    let manager = match ConfigManager::load_from_directory(cli.config_dir.map(PathBuf::from)) {
        Ok(manager) => manager,
        Err(e) => {
            error!(error = %e, "configuration invalid");
            process::exit(2);
        }
    };
    let config = manager.config().clone();

    let code = match cli.command {
        Commands::Monitor {
            run_loop,
            interval,
            send_when_idle,
            format,
        } => match run_monitor(&config, run_loop, interval, send_when_idle, format).await {
            Ok(()) => 0,
            Err(e) => {
                error!(error = %e, "monitor failed");
                2
            }
        },
        Commands::Deposit {
            account,
            amount,
            reference,
        } => {
            run_operation(
                &config,
                OperationKind::Deposit {
                    account_id: account,
                    amount,
                },
                reference,
            )
            .await
        }
        Commands::Withdraw {
            account,
            amount,
            reference,
        } => {
            run_operation(
                &config,
                OperationKind::Withdraw {
                    account_id: account,
                    amount,
                },
                reference,
            )
            .await
        }
        Commands::Transfer {
            from_id,
            to_id,
            amount,
            reference,
        } => {
            run_operation(
                &config,
                OperationKind::Transfer {
                    from_account: from_id,
                    to_account: to_id,
                    amount,
                },
                reference,
            )
            .await
        }
        Commands::ShowAccounts => match show_accounts(&config).await {
            Ok(()) => 0,
            Err(e) => {
                error!(error = %e, "show-accounts failed");
                2
            }
        },
        Commands::ShowErrors { limit } => match show_errors(&config, limit).await {
            Ok(()) => 0,
            Err(e) => {
                error!(error = %e, "show-errors failed");
                2
            }
        },
        Commands::HealthCheck => match health_check(&config).await {
            Ok(()) => 0,
            Err(e) => {
                error!(error = %e, "health-check failed");
                2
            }
        },
    };

    process::exit(code);
}
