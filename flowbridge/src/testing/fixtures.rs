//! On-disk module fixtures for discovery tests.

use crate::discovery::{ModuleIdentity, SignerAllowList, SignerToken};
use std::path::{Path, PathBuf};

/// Returns the six default platform signer tokens.
#[must_use]
pub fn platform_signer_tokens() -> [SignerToken; 6] {
    SignerAllowList::platform_tokens()
}

/// Writes a module file with a valid identity header into `dir`.
///
/// Returns the path of the written file.
pub fn write_module(
    dir: &Path,
    name: &str,
    extension: &str,
    signer: SignerToken,
) -> std::io::Result<PathBuf> {
    let identity = ModuleIdentity::new(name, signer);
    let mut bytes = identity.to_header_bytes();
    bytes.extend_from_slice(b"\0module body\0");

    let path = dir.join(format!("{name}.{extension}"));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Writes a file with a module extension but a garbage header.
pub fn write_corrupt_module(dir: &Path, name: &str, extension: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("{name}.{extension}"));
    std::fs::write(&path, b"this is not a module header")?;
    Ok(path)
}
