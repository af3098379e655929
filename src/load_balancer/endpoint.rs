//! Endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single backend base address
//! - Normalize the address (trailing slashes stripped) so that
//!   `https://a/` and `https://a` identify the same endpoint
//! - Build request targets below the base address

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use url::Url;

use crate::error::ConfigurationError;

/// A single backend base address.
///
/// Immutable and cheap to clone. Equality and hashing only look at the
/// normalized base URI.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base_uri: Arc<str>,
    url: Url,
}

impl Endpoint {
    /// Parse and normalize an absolute URI.
    pub fn parse(uri: &str) -> Result<Self, ConfigurationError> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(ConfigurationError::EmptyUri);
        }

        let url = Url::parse(trimmed).map_err(|source| ConfigurationError::InvalidUri {
            uri: trimmed.to_string(),
            source,
        })?;

        Ok(Self::from_url(url))
    }

    /// Build an endpoint from an already parsed URL.
    pub fn from_url(url: Url) -> Self {
        let base_uri: Arc<str> = Arc::from(url.as_str().trim_end_matches('/'));
        Self { base_uri, url }
    }

    /// The normalized base URI, never ending in `/`.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// The parsed form of the address.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Append path segments to the base URI.
    ///
    /// Segments are joined with `/`; slashes at either end of a segment are
    /// dropped and empty segments are skipped.
    pub fn build_uri(&self, segments: &[&str]) -> String {
        let mut uri = String::from(self.base_uri());
        for segment in segments {
            let segment = segment.trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            uri.push('/');
            uri.push_str(segment);
        }
        uri
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.base_uri == other.base_uri
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_uri.hash(state);
    }
}

impl FromStr for Endpoint {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_uri)
    }
}

impl Serialize for Endpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.base_uri)
    }
}
