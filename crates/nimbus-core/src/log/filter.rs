//! Caller-supplied allow-list of log classifications.

use std::str::FromStr;

use nimbus_platform::Environment;

use super::classification::{Classification, END_OF_LIST, UnknownClassification};

/// Environment variable holding a comma-separated list of classification names.
pub const LOG_CLASSIFICATIONS_ENV: &str = "NIMBUS_LOG_CLASSIFICATIONS";

/// An ordered, bounded allow-list of classifications.
///
/// Registering a filter restricts emission to the classifications it
/// contains. An empty filter lets nothing through; "no filter" (not
/// registering one) lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationFilter {
    entries: Vec<Classification>,
}

impl ClassificationFilter {
    pub fn new(entries: impl IntoIterator<Item = Classification>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Build a filter from raw classification codes.
    ///
    /// Reading stops at the first [`END_OF_LIST`] or at the end of the slice.
    /// Every code before that must be a known classification: an unknown code
    /// is a programming error and fails a debug assertion. Release builds
    /// drop the code with a warning.
    pub fn from_codes(codes: &[i32]) -> Self {
        let mut entries = Vec::new();
        for &code in codes.iter().take_while(|&&c| c != END_OF_LIST) {
            match Classification::from_code(code) {
                Some(c) => entries.push(c),
                None => {
                    debug_assert!(false, "unknown log classification code {code:#x}");
                    tracing::warn!(code, "ignoring unknown log classification code");
                }
            }
        }
        Self { entries }
    }

    /// Strict variant of [`from_codes`](Self::from_codes) for data read at runtime.
    pub fn try_from_codes(codes: &[i32]) -> Result<Self, UnknownClassification> {
        codes
            .iter()
            .take_while(|&&c| c != END_OF_LIST)
            .map(|&c| Classification::try_from(c))
            .collect::<Result<Vec<_>, _>>()
            .map(|entries| Self { entries })
    }

    /// Read [`LOG_CLASSIFICATIONS_ENV`] from the environment.
    ///
    /// Returns `Ok(None)` when the variable is unset or blank, meaning "no
    /// filter".
    pub fn from_env(env: &dyn Environment) -> Result<Option<Self>, UnknownClassification> {
        match env.get_var(LOG_CLASSIFICATIONS_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some),
            _ => Ok(None),
        }
    }

    /// Whether `classification` is allowed by this filter.
    pub fn contains(&self, classification: Classification) -> bool {
        self.entries.iter().any(|&c| c == classification)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Classification> + '_ {
        self.entries.iter().copied()
    }

    /// Raw codes terminated by [`END_OF_LIST`]; the inverse of
    /// [`from_codes`](Self::from_codes).
    pub fn to_codes(&self) -> Vec<i32> {
        self.entries
            .iter()
            .map(|c| c.code())
            .chain(std::iter::once(END_OF_LIST))
            .collect()
    }
}

impl FromStr for ClassificationFilter {
    type Err = UnknownClassification;

    /// Parse a comma-separated list of dotted names (`http.request,http.retry`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Classification::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(|entries| Self { entries })
    }
}

impl FromIterator<Classification> for ClassificationFilter {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        Self::new(iter)
    }
}
