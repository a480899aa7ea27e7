//! OGC service probe CLI.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use service_probe::{ResultsReport, Suite, SuiteReport, SuiteRunner};

#[derive(Parser)]
#[command(name = "ogc-probe")]
#[command(about = "Keyword-style checks against OGC WFS/WMS services", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "info", env = "OGC_PROBE_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a suite file
    Run {
        /// Path to suite YAML file
        #[arg(short, long)]
        suite: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        /// Override the suite's service_url
        #[arg(long, env = "OGC_PROBE_SERVICE_URL")]
        service_url: Option<String>,
    },

    /// List the available keywords
    Keywords,

    /// Run a quick smoke test against one endpoint
    Quick {
        /// OGC endpoint (e.g. http://localhost:8080/geoserver/ows)
        #[arg(short, long)]
        url: String,

        /// WFS version
        #[arg(short, long, default_value = "1.1.0")]
        protocol_version: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Run {
            suite,
            output,
            service_url,
        } => {
            let mut suite = Suite::from_file(&suite)?;
            if let Some(url) = service_url {
                suite.settings.service_url = url;
            }
            info!(suite = %suite.name, tests = suite.tests.len(), "Loaded suite");

            let report = run(&suite).await?;
            match output {
                OutputFormat::Json => println!("{}", ResultsReport::format_json(&report)?),
                OutputFormat::Table => println!("{}", ResultsReport::format_table(&report)),
            }
            finish(&report)
        }
        Commands::Keywords => {
            println!("{}", ResultsReport::format_keywords());
            Ok(())
        }
        Commands::Quick {
            url,
            protocol_version,
        } => {
            let suite = Suite::quick(&url, &protocol_version);
            let report = run(&suite).await?;
            println!("{}", ResultsReport::format_table(&report));
            finish(&report)
        }
    }
}

async fn run(suite: &Suite) -> anyhow::Result<SuiteReport> {
    let mut runner = SuiteRunner::for_suite(suite).context("Failed to set up the probe")?;
    Ok(runner.run(suite).await)
}

fn finish(report: &SuiteReport) -> anyhow::Result<()> {
    if !report.all_passed() {
        anyhow::bail!("{} of {} test cases failed", report.failed(), report.total());
    }
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> anyhow::Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so JSON reports on stdout stay parseable
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
