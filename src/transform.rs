//! Contractive block maps: symmetries, single transforms and per-channel transform sets.

pub(crate) mod block;
pub(crate) mod set;
pub(crate) mod symmetry;
