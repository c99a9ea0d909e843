//! Iterated reconstruction of an image from its transform set.

pub(crate) mod decoder;
