//! Quadtree encoder: range blocks are matched against a shared half-resolution domain pool.

pub(crate) mod options;
pub(crate) mod quadtree;
pub(crate) mod search;
