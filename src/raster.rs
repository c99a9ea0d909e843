pub(crate) mod io;
pub(crate) mod metrics;
pub(crate) mod plane;
