//! Platform signer allow-list.

use super::identity::SignerToken;
use std::collections::HashSet;

/// Signing tokens of modules the host platform deploys itself.
///
/// Modules signed with these are assumed to already be present in the host
/// runtime and are left to the host's own loader; reloading them risks
/// version conflicts.
const PLATFORM_SIGNER_TOKENS: [SignerToken; 6] = [
    SignerToken::new([0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]),
    SignerToken::new([0xb0, 0x3f, 0x5f, 0x7f, 0x11, 0xd5, 0x0a, 0x3a]),
    SignerToken::new([0x31, 0xbf, 0x38, 0x56, 0xad, 0x36, 0x4e, 0x35]),
    SignerToken::new([0x7c, 0xec, 0x85, 0xd7, 0xbe, 0xa7, 0x79, 0x8e]),
    SignerToken::new([0xcc, 0x7b, 0x13, 0xff, 0xcd, 0x2d, 0xdd, 0x51]),
    SignerToken::new([0xad, 0xb9, 0x79, 0x38, 0x29, 0xdd, 0xae, 0x60]),
];

/// Allow-list of signer tokens whose modules the scanner skips.
///
/// The platform's signing keys are configuration, not a constant: hosts whose
/// platform rotates its keys replace or extend the default set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerAllowList {
    tokens: HashSet<SignerToken>,
}

impl SignerAllowList {
    /// The six known platform-vendor signing tokens.
    #[must_use]
    pub const fn platform_tokens() -> [SignerToken; 6] {
        PLATFORM_SIGNER_TOKENS
    }

    /// An allow-list of the six known platform-vendor signing tokens.
    #[must_use]
    pub fn platform_defaults() -> Self {
        Self {
            tokens: PLATFORM_SIGNER_TOKENS.into_iter().collect(),
        }
    }

    /// An empty allow-list; every discovered module is loaded.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tokens: HashSet::new(),
        }
    }

    /// Builds an allow-list from the given tokens.
    #[must_use]
    pub fn from_tokens(tokens: impl IntoIterator<Item = SignerToken>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// Adds a token to the allow-list.
    pub fn insert(&mut self, token: SignerToken) {
        self.tokens.insert(token);
    }

    /// Returns true if the token belongs to a platform signer.
    #[must_use]
    pub fn contains(&self, token: &SignerToken) -> bool {
        self.tokens.contains(token)
    }

    /// Returns the number of tokens in the allow-list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the allow-list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for SignerAllowList {
    fn default() -> Self {
        Self::platform_defaults()
    }
}
