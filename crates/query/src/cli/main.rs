//! Query Compiler CLI
//!
//! Reads a reporting search or aggregation request as JSON, validates it,
//! and prints the compiled search request.
//!
//! # Usage
//!
//! ```bash
//! # Compile a device search from a file
//! query-compiler --tenant-id t1 search.json
//!
//! # Compile a deployment aggregation from stdin
//! cat aggs.json | query-compiler --domain deployments --kind aggregate
//!
//! # Restrict devices to groups
//! query-compiler --group prod --group staging search.json
//! ```
//!
//! # Environment Variables
//!
//! - `REPORTING_DEVICES_INDEX_NAME` - Device index (default: devices)
//! - `REPORTING_DEPLOYMENTS_INDEX_NAME` - Deployment index (default: deployments)
//! - `REPORTING_DEFAULT_PER_PAGE` - Default page size (default: 20)
//! - `REPORTING_MAX_PER_PAGE` - Maximum page size (default: 500)
//! - `REPORTING_LOG_LEVEL` - Log level (default: info)

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use reporting_query::types::{
    AggregateDeploymentsParams, AggregateParams, DeploymentsSearchParams, SearchParams,
};
use reporting_query::{ReportingConfig, RequestCompiler, SearchRequest, init_logging};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Domain {
    Devices,
    Deployments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Search,
    Aggregate,
}

#[derive(Debug, Parser)]
#[command(name = "query-compiler", version)]
#[command(about = "Compiles reporting search requests into search engine queries")]
struct Cli {
    /// Request file; reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Which index the request targets.
    #[arg(long, value_enum, default_value = "devices")]
    domain: Domain,

    /// Search or aggregation request.
    #[arg(long, value_enum, default_value = "search")]
    kind: Kind,

    /// Tenant the request runs for.
    #[arg(long, default_value = "")]
    tenant_id: String,

    /// Group the caller is restricted to (repeatable).
    #[arg(long = "group")]
    groups: Vec<String>,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,

    #[command(flatten)]
    config: ReportingConfig,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    let mut input = String::new();
    match path {
        Some(path) if path.as_os_str() != "-" => {
            input = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
        }
        _ => {
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
        }
    }
    Ok(input)
}

fn compile(cli: &Cli, input: &str) -> Result<SearchRequest> {
    let compiler = RequestCompiler::new(&cli.config);
    let request = match (cli.domain, cli.kind) {
        (Domain::Devices, Kind::Search) => {
            let mut params: SearchParams = serde_json::from_str(input)?;
            params.tenant_id = cli.tenant_id.clone();
            params.groups = cli.groups.clone();
            compiler.compile_device_search(&params)?
        }
        (Domain::Devices, Kind::Aggregate) => {
            let mut params: AggregateParams = serde_json::from_str(input)?;
            params.tenant_id = cli.tenant_id.clone();
            params.groups = cli.groups.clone();
            compiler.compile_device_aggregation(&params)?
        }
        (Domain::Deployments, Kind::Search) => {
            let mut params: DeploymentsSearchParams = serde_json::from_str(input)?;
            params.tenant_id = cli.tenant_id.clone();
            params.deployment_groups = cli.groups.clone();
            compiler.compile_deployments_search(&params)?
        }
        (Domain::Deployments, Kind::Aggregate) => {
            let mut params: AggregateDeploymentsParams = serde_json::from_str(input)?;
            params.tenant_id = cli.tenant_id.clone();
            params.deployment_groups = cli.groups.clone();
            compiler.compile_deployments_aggregation(&params)?
        }
    };
    Ok(request)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config.log_level);

    if let Err(errors) = cli.config.validate() {
        bail!("invalid configuration: {}", errors.join(", "));
    }

    let input = read_input(cli.input.as_ref())?;
    let request = compile(&cli, &input)?;

    tracing::info!(index = %request.index, "Compiled request");

    let json = if cli.compact {
        serde_json::to_string(&request)?
    } else {
        serde_json::to_string_pretty(&request)?
    };
    println!("{}", json);
    Ok(())
}
