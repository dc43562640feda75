//! Pairing of a built pipeline with an external model reference.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::info;

use crate::builder::build_pipeline;
use crate::compose::Sequential;
use crate::config::BundleConfig;
use crate::error::Result;
use crate::registry::Registry;
use crate::unit::TransformUnit;

/// Opaque reference to an externally trained model artifact.
///
/// The engine never opens it; it only carries the path so a caller can hand
/// the transformed frame and the artifact to whatever does the predicting.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRef {
    path: PathBuf,
}

impl ModelRef {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A built pipeline plus an optional model reference.
pub struct Bundle {
    pipeline: Option<Sequential>,
    model: Option<ModelRef>,
}

static_assertions::assert_impl_all!(Bundle: Send);

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("pipeline", &self.pipeline.as_ref().map(|_| "<Sequential>"))
            .field("model", &self.model)
            .finish()
    }
}

impl Bundle {
    /// Build the configured pipeline through the registry.
    ///
    /// An absent `pipeline` key yields a bundle with no pipeline at all, as
    /// opposed to an empty list, which yields an empty (identity) chain.
    pub fn from_config(registry: &Registry, config: &BundleConfig) -> Result<Self> {
        let pipeline = match &config.pipeline {
            Some(nodes) => {
                info!("building pipeline with {} top-level unit(s)", nodes.len());
                Some(build_pipeline(registry, nodes)?)
            }
            None => None,
        };
        let model = config
            .model
            .as_ref()
            .map(|path| ModelRef { path: path.clone() });
        Ok(Self { pipeline, model })
    }

    /// Run the pipeline over a frame; identity when none is configured.
    pub fn run(&mut self, df: DataFrame) -> Result<DataFrame> {
        match &mut self.pipeline {
            Some(pipeline) => pipeline.apply(df),
            None => Ok(df),
        }
    }

    pub fn pipeline(&self) -> Option<&Sequential> {
        self.pipeline.as_ref()
    }

    pub fn model(&self) -> Option<&ModelRef> {
        self.model.as_ref()
    }
}
