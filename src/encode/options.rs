use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::error::{FractalError, FractalResult},
    transform::symmetry::{Symmetry, SymmetrySet},
};

/// Encoder configuration.
///
/// Loadable from JSON; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderOptions {
    /// Subdivide a block while its best match error is at or above this value.
    ///
    /// Higher is coarser, smaller and lossier; lower is finer and larger.
    pub quality_threshold: u32,
    /// Symmetries tried for every domain candidate, in ordinal order.
    pub symmetries: SymmetrySet,
    /// Parallel search settings.
    pub threading: EncodeThreading,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            quality_threshold: 100,
            symmetries: SymmetrySet::identity_only(),
            threading: EncodeThreading::default(),
        }
    }
}

/// Parallelism controls for the block search.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeThreading {
    /// Search top-level blocks on a rayon pool. Output is identical to the sequential path.
    pub parallel: bool,
    /// Worker thread count; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl EncoderOptions {
    /// Reject empty symmetry sets, flip-diagonal, and a zero thread count.
    pub fn validate(&self) -> FractalResult<()> {
        if self.symmetries.is_empty() {
            return Err(FractalError::validation(
                "encoder needs at least one symmetry to search",
            ));
        }
        if self.symmetries.contains(Symmetry::FlipDiagonal) {
            return Err(FractalError::validation(
                "the encoder never emits flip-diagonal; remove it from the symmetry set",
            ));
        }
        if let Some(n) = self.threading.threads
            && n == 0
        {
            return Err(FractalError::validation(
                "encode threading 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }

    /// Parse and validate options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FractalResult<Self> {
        let opts: Self = serde_json::from_reader(r)
            .map_err(|e| FractalError::serde(format!("parse encoder options JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse and validate an options file.
    pub fn from_path(path: impl AsRef<Path>) -> FractalResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FractalError::validation(format!("open encoder options '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/options.rs"]
mod tests;
