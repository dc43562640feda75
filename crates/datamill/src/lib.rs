//! Declarative Data Transformation Pipelines
//!
//! A composable pipeline engine built with Rust and Polars: a nested,
//! string-keyed configuration is interpreted into a tree of transformation
//! units that execute, in order, over a tabular dataset to add, replace, or
//! drop columns.
//!
//! # Overview
//!
//! - **Registry**: explicit name-to-constructor lookup, populated once at
//!   startup; no global registration state
//! - **Uniform unit contract**: every step implements [`TransformUnit`] and
//!   declares whether it emits new columns or rewrites the frame
//! - **Composition**: sequential chains, fan-out merges, and an adapter that
//!   lifts raw-buffer transforms into table pipelines
//! - **Stateful units**: scalers and encoders learn their parameters on the
//!   first batch and reuse them afterwards
//! - **Bounded-run imputation**: fill short gaps, leave long gaps alone
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datamill::{Bundle, BundleConfig, Registry};
//! use polars::prelude::*;
//!
//! let registry = Registry::with_builtins();
//! let config = BundleConfig::from_json_file("pipeline.json")?;
//! let mut bundle = Bundle::from_config(&registry, &config)?;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("data.csv".into()))?
//!     .finish()?;
//!
//! let out = bundle.run(df)?;
//! println!("{}", out);
//! ```
//!
//! # Configuration
//!
//! A pipeline is a JSON list of single-key nodes; composition units nest the
//! same grammar recursively:
//!
//! ```json
//! {
//!   "pipeline": [
//!     {"fill_gaps": {"col": "load", "max_run": 3, "fill": 0.0}},
//!     {"concat": {"units": [
//!       {"day_of_year": {"col": "when"}},
//!       {"add": {"col1": "a", "col2": "b"}}
//!     ]}},
//!     {"standard_scale": {"cols": ["load"]}}
//!   ]
//! }
//! ```
//!
//! Custom units implement [`TransformUnit`] plus [`UnitSpec`] and register
//! through [`Registry::register_default`].

pub mod builder;
pub mod bundle;
pub mod compose;
pub mod config;
pub mod error;
pub mod registry;
pub mod unit;
pub mod units;
pub mod utils;

// Re-exports for convenient access
pub use builder::{build_pipeline, build_unit, build_units};
pub use bundle::{Bundle, ModelRef};
pub use compose::{ColumnAdapter, Concat, Sequential};
pub use config::{BundleConfig, UnitNode};
pub use error::{PipelineError, Result, ResultExt};
pub use registry::{Registry, UnitFactory};
pub use unit::{ArrayTransform, FitState, OutputKind, TransformUnit, UnitSpec};
pub use units::missing::fill_bounded_runs;
