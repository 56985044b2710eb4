//! CLI command implementations.

pub(crate) mod dump;
pub(crate) mod serve;

pub(crate) use dump::DumpArgs;
pub(crate) use serve::ServeArgs;
