//! Module identity headers.
//!
//! Extension modules deployed next to the function app open with a small
//! identity header: magic bytes, a format version, the module name, and the
//! vendor's 8-byte signing token. The scanner reads only this header to
//! decide whether to load a module; it never maps the module body.

use crate::errors::LoadError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic bytes opening a module identity header.
pub const MODULE_MAGIC: [u8; 4] = *b"MBIN";

/// Identity header format version understood by this scanner.
pub const HEADER_VERSION: u8 = 1;

/// An 8-byte vendor code-signing token.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignerToken([u8; 8]);

impl SignerToken {
    /// Creates a token from its raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Parses a token from its 16-character hex form.
    pub fn parse(token: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(token)?;
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(bytes))
    }

    /// Returns the raw token bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl std::fmt::Display for SignerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for SignerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignerToken({self})")
    }
}

/// Identity of a deployable module: its name plus the signer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentity {
    /// The module name from its identity header.
    pub name: String,
    /// The vendor signing token from its identity header.
    pub signer: SignerToken,
}

impl ModuleIdentity {
    /// Creates an identity value.
    #[must_use]
    pub fn new(name: impl Into<String>, signer: SignerToken) -> Self {
        Self {
            name: name.into(),
            signer,
        }
    }

    /// Reads a module's identity header without loading the module.
    ///
    /// Header layout: 4-byte magic, 1-byte format version, 2-byte big-endian
    /// name length, the UTF-8 name, then the 8-byte signer token.
    pub fn read_from(path: &Path) -> Result<Self, LoadError> {
        let mut file = File::open(path)?;

        let mut fixed = [0u8; 7];
        read_header_bytes(&mut file, &mut fixed)?;

        if fixed[..4] != MODULE_MAGIC {
            return Err(LoadError::BadMagic);
        }
        let version = fixed[4];
        if version != HEADER_VERSION {
            return Err(LoadError::UnsupportedVersion(version));
        }

        let name_len = usize::from(u16::from_be_bytes([fixed[5], fixed[6]]));
        let mut name_bytes = vec![0u8; name_len];
        read_header_bytes(&mut file, &mut name_bytes)?;
        let name = String::from_utf8(name_bytes).map_err(|_| LoadError::InvalidName)?;

        let mut token = [0u8; 8];
        read_header_bytes(&mut file, &mut token)?;

        Ok(Self {
            name,
            signer: SignerToken::new(token),
        })
    }

    /// Serializes this identity as a header, the inverse of
    /// [`read_from`](Self::read_from).
    #[must_use]
    pub fn to_header_bytes(&self) -> Vec<u8> {
        let name_bytes = self.name.as_bytes();
        let name_len = u16::try_from(name_bytes.len()).unwrap_or(u16::MAX);

        let mut header = Vec::with_capacity(7 + name_bytes.len() + 8);
        header.extend_from_slice(&MODULE_MAGIC);
        header.push(HEADER_VERSION);
        header.extend_from_slice(&name_len.to_be_bytes());
        header.extend_from_slice(&name_bytes[..usize::from(name_len)]);
        header.extend_from_slice(self.signer.as_bytes());
        header
    }
}

impl std::fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.signer)
    }
}

fn read_header_bytes(file: &mut File, buf: &mut [u8]) -> Result<(), LoadError> {
    file.read_exact(buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            LoadError::TruncatedHeader
        } else {
            LoadError::Io(err)
        }
    })
}
