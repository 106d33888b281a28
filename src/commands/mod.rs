//! CLI command implementations
//!
//! Chain commands run against an attached [`ChainDriver`], whatever the
//! transport behind it. The annotate and list commands need no chain.
//!
//! [`ChainDriver`]: maxchain_core::ChainDriver

mod annotate;
pub mod chain;
mod list;

pub use annotate::run_annotate;
pub use list::list_transports;
