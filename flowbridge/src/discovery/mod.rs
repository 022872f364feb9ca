//! Module discovery for the binaries directory.
//!
//! This module provides:
//! - Identity header reading for deployed extension modules
//! - The platform signer allow-list
//! - The load-context seam to the host runtime's loader
//! - The best-effort directory scanner

mod allowlist;
mod identity;
mod load_context;
mod scanner;

pub use allowlist::SignerAllowList;
pub use identity::{ModuleIdentity, SignerToken, HEADER_VERSION, MODULE_MAGIC};
pub use load_context::{CollectingLoadContext, ModuleLoadContext};
pub use scanner::{DirectoryResolver, DiscoveryOptions, ModuleScanner, ScanSummary};
