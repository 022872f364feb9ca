//! Binaries-directory scan.
//!
//! Serverless hosts deploy function dependencies into a binaries directory.
//! The framework's handler discovery requires those modules to be present in
//! the load context before endpoint startup scans for handlers, while
//! platform-provided modules must be left to the host's own loader.

use super::allowlist::SignerAllowList;
use super::identity::ModuleIdentity;
use super::load_context::{CollectingLoadContext, ModuleLoadContext};
use crate::context::InvocationContext;
use crate::errors::{BridgeError, LoadError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolves the directory to scan from an invocation context.
///
/// Returning `None` disables the scan for that invocation.
pub type DirectoryResolver = dyn Fn(&InvocationContext) -> Option<PathBuf> + Send + Sync;

/// Configuration for the module discovery scan.
///
/// Both the directory resolver and the allow-list are supplied here rather
/// than hard-coded, so the scan is testable without real platform files and
/// survives a platform key rotation.
pub struct DiscoveryOptions {
    resolver: Box<DirectoryResolver>,
    allow_list: SignerAllowList,
    extension: String,
    load_context: Arc<dyn ModuleLoadContext>,
}

impl std::fmt::Debug for DiscoveryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryOptions")
            .field("allow_list", &self.allow_list)
            .field("extension", &self.extension)
            .finish()
    }
}

impl DiscoveryOptions {
    /// Options scanning `<function_app_dir>/bin` for modules with the
    /// platform's dynamic-module extension, skipping the default platform
    /// signers, loading through the given context.
    #[must_use]
    pub fn new(load_context: Arc<dyn ModuleLoadContext>) -> Self {
        Self {
            resolver: Box::new(|ctx| Some(ctx.function_app_dir().join("bin"))),
            allow_list: SignerAllowList::platform_defaults(),
            extension: std::env::consts::DLL_EXTENSION.to_string(),
            load_context,
        }
    }

    /// Options that skip discovery entirely.
    ///
    /// For hosts whose load context already contains every handler module.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            resolver: Box::new(|_ctx| None),
            allow_list: SignerAllowList::platform_defaults(),
            extension: std::env::consts::DLL_EXTENSION.to_string(),
            load_context: Arc::new(CollectingLoadContext::new()),
        }
    }

    /// Sets the directory resolver.
    #[must_use]
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&InvocationContext) -> Option<PathBuf> + Send + Sync + 'static,
    {
        self.resolver = Box::new(resolver);
        self
    }

    /// Sets the signer allow-list.
    #[must_use]
    pub fn with_allow_list(mut self, allow_list: SignerAllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Sets the module file extension to scan for.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Counts from one discovery scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Modules handed to the load context and accepted.
    pub loaded: usize,
    /// Platform-signed modules left to the host's loader.
    pub skipped: usize,
    /// Modules whose header read or load attempt failed.
    pub failed: usize,
}

enum LoadDisposition {
    Loaded,
    Skipped,
}

/// Scans a binaries directory and loads non-platform modules, best effort.
pub struct ModuleScanner {
    options: DiscoveryOptions,
}

impl std::fmt::Debug for ModuleScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleScanner")
            .field("options", &self.options)
            .finish()
    }
}

impl ModuleScanner {
    /// Creates a scanner with the given options.
    #[must_use]
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options }
    }

    /// Runs the scan for one invocation.
    ///
    /// Per-file failures are logged at debug level with the file name and
    /// the scan continues; only directory enumeration errors escape.
    pub fn scan(&self, ctx: &InvocationContext) -> Result<ScanSummary, BridgeError> {
        let Some(dir) = (self.options.resolver)(ctx) else {
            debug!("Module discovery disabled; no directory resolved");
            return Ok(ScanSummary::default());
        };

        debug!(directory = %dir.display(), "Scanning binaries directory");
        let mut summary = ScanSummary::default();

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() {
                continue;
            }
            let has_module_extension = path
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .is_some_and(|ext| ext == self.options.extension);
            if !has_module_extension {
                continue;
            }

            match self.try_load(&path, ctx) {
                Ok(LoadDisposition::Loaded) => summary.loaded += 1,
                Ok(LoadDisposition::Skipped) => summary.skipped += 1,
                Err(err) => {
                    debug!(
                        file = %path.display(),
                        error = %err,
                        "Module failed to load; continuing scan"
                    );
                    ctx.try_emit_event(
                        "discovery.module_failed",
                        Some(serde_json::json!({
                            "file": path.display().to_string(),
                            "error": err.to_string(),
                        })),
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    fn try_load(
        &self,
        path: &std::path::Path,
        ctx: &InvocationContext,
    ) -> Result<LoadDisposition, LoadError> {
        let identity = ModuleIdentity::read_from(path)?;

        if self.options.allow_list.contains(&identity.signer) {
            debug!(module = %identity, "Skipping platform-signed module");
            ctx.try_emit_event(
                "discovery.module_skipped",
                Some(serde_json::json!({
                    "module": identity.name,
                    "signer": identity.signer.to_string(),
                })),
            );
            return Ok(LoadDisposition::Skipped);
        }

        self.options.load_context.load(&identity, path)?;
        debug!(module = %identity, "Loaded module");
        ctx.try_emit_event(
            "discovery.module_loaded",
            Some(serde_json::json!({
                "module": identity.name,
                "signer": identity.signer.to_string(),
            })),
        );
        Ok(LoadDisposition::Loaded)
    }
}
