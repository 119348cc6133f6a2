//! # Version Tokens and Version Sets (`fingerprint::token`)
//!
//! File: cli/src/fingerprint/token.rs
//!
//! ## Overview
//!
//! A `VersionToken` is one normalized `v<digits>/` path segment found in an
//! archive's directory structure. A `VersionSet` is the ordered, duplicate-free
//! collection of tokens found in one archive, kept in first-encountered order.
//!
//! Ordering of tokens is plain lexicographic string ordering. This means
//! `v10/` sorts *before* `v9/`, and the "highest" token of `["v9/", "v10/"]`
//! is `v9/`. Callers relying on numeric ordering must not use `sorted()`.
//!
use crate::core::error::FingerprintError;
use std::fmt;

/// A normalized version path segment such as `v12/`.
///
/// The inner string is always trimmed, lower-cased and terminated by exactly
/// one `/`, so two tokens are equal iff their normalized text is equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    /// Normalizes a raw segment (`V2`, `v2/`, ` v2 `) into a token.
    pub fn new(segment: &str) -> Self {
        let trimmed = segment.trim();
        let bare = trimmed.strip_suffix('/').unwrap_or(trimmed);
        VersionToken(format!("{}/", bare.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strips the leading non-digits and the trailing `/` and parses the rest.
    ///
    /// `v12/` yields `12`. Fails with `InvalidVersionNumber` when no digits
    /// remain or the number does not fit in a `u64`.
    pub fn version_number(&self) -> Result<u64, FingerprintError> {
        let digits = self.0.trim_start_matches(|c: char| !c.is_ascii_digit());
        let digits = digits.strip_suffix('/').unwrap_or(digits);
        digits
            .parse::<u64>()
            .map_err(|_| FingerprintError::InvalidVersionNumber {
                token: self.0.clone(),
            })
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The fingerprint of one archive: distinct version tokens in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSet {
    tokens: Vec<VersionToken>,
}

impl VersionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `token` unless an identical token is already present.
    ///
    /// Returns `true` if the token was added.
    pub fn insert(&mut self, token: VersionToken) -> bool {
        if self.tokens.contains(&token) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    /// Tokens in first-encountered order.
    pub fn tokens(&self) -> &[VersionToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in lexicographic order (`v10/` before `v9/`).
    pub fn sorted(&self) -> Vec<VersionToken> {
        let mut sorted = self.tokens.clone();
        sorted.sort();
        sorted
    }

    /// Version number of the lexicographically-last token.
    ///
    /// # Errors
    ///
    /// `EmptySet` if the set holds no tokens.
    pub fn highest_version_number(&self) -> Result<u64, FingerprintError> {
        let highest = self.tokens.iter().max().ok_or(FingerprintError::EmptySet)?;
        highest.version_number()
    }
}

impl FromIterator<VersionToken> for VersionSet {
    fn from_iter<I: IntoIterator<Item = VersionToken>>(iter: I) -> Self {
        let mut set = VersionSet::new();
        for token in iter {
            set.insert(token);
        }
        set
    }
}
