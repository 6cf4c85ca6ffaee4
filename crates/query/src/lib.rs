//! # reporting-query - Search and Aggregation Query Compiler
//!
//! This crate turns the device and deployment search requests of a
//! multi-tenant reporting service into search engine query documents
//! (OpenSearch / Elasticsearch query DSL). It does no I/O: requests come in
//! already decoded, compiled documents go out for a search client to send.
//!
//! ## Features
//!
//! - **Typed Predicates**: filter values are classified once, on decode
//! - **Ten Operators**: `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`,
//!   `$nin`, `$exists`, `$regex`
//! - **Type Fan-out**: attributes of unknown type are sorted, projected and
//!   existence-checked under all their type-suffixed fields
//! - **Geo Filters**: distance and bounding box filters on device location
//! - **Aggregations**: nested terms aggregations with structural limits
//! - **Multi-Tenant**: request compilers scope every query to its tenant
//!
//! ## Field Naming
//!
//! Device attributes live in scopes (`identity`, `inventory`, `monitor`,
//! `system`, `tags`) and carry no fixed type, so the index stores each one
//! under `<scope>_<name>_<str|num|bool>`. Deployment attributes are flat
//! and use their plain name.
//!
//! ## Quick Start
//!
//! ```rust
//! use reporting_query::types::{FilterPredicate, Operator, SearchParams};
//! use reporting_query::{Validate, build_query};
//!
//! let mut params = SearchParams::new(1, 20);
//! params.filters.push(FilterPredicate::new("identity", "mac", Operator::Eq, "00:11:22"));
//! params.validate().unwrap();
//!
//! let query = build_query(&params).unwrap();
//! let body = serde_json::to_value(&query).unwrap();
//! assert_eq!(
//!     body["query"]["bool"]["must"][0],
//!     serde_json::json!({"match": {"identity_mac_str": "00:11:22"}})
//! );
//! ```
//!
//! ## Error Handling
//!
//! Every error is the result of client input and should be reported as a
//! bad request:
//!
//! | Error | Raised by | Example |
//! |-------|-----------|---------|
//! | [`ValidationErrors`] | `validate()` | `scope: cannot be blank.` |
//! | [`FilterError`] | `build_*` | `filter supports only array values` |

pub mod config;
pub mod error;
pub mod query;
pub mod request;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::ReportingConfig;
pub use error::{FilterError, QueryError, QueryResult};
pub use query::{
    Aggregations, Query, QueryPart, build_aggregations, build_deployments_aggregations,
    build_deployments_query, build_query,
};
pub use request::{RequestCompiler, SearchRequest};
pub use validation::{FieldError, Validate, ValidationErrors};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level`. Call once at startup.
#[cfg(feature = "cli")]
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reporting_query={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
