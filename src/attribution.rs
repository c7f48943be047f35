//! Marketing-source attribution.
//!
//! Every tracking number a caller can dial is tied to one campaign or
//! location. The tables are built once at startup, either from the built-in
//! lists below or from a JSON file, and are never mutated afterwards.

use std::{collections::HashMap, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::normalization::digits_only;
use crate::providers::ProviderKind;

/// Label used when a tracking number is not in the provider's table.
pub const UNKNOWN_SOURCE: &str = "Unknown";

const CALLRAIL_SOURCES: &[(&str, &str)] = &[
    ("8565531087", "Google ads"),
    ("8565538120", "Google ads"),
    ("6094017723", "Google ads"),
    ("2153984410", "Google ads"),
    ("8662714069", "GMB ads"),
    ("8566372290", "Google ads extension"),
];

const TWILIO_SOURCES: &[(&str, &str)] = &[
    ("8567539700", "Main"),
    ("8567539711", "Brochure"),
    ("8565450033", "Website"),
    ("8009701002", "800#"),
    ("6092301455", "GMB Cherry Hill"),
    ("6098550172", "GMB Princeton"),
    ("2156460918", "GMB Philadelphia"),
    ("3024150266", "GMB Wilmington"),
    ("6093771440", "GMB Toms River"),
    ("7322090315", "GMB Edison"),
    ("8567771220", "GMB Vineland"),
    ("6103950481", "GMB King of Prussia"),
    ("4848820117", "GMB Allentown"),
    ("6099380250", "GMB Atlantic City"),
];

/// Errors raised while loading a source map file.
#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("failed to read source map {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse source map {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("source map entry '{number}' for {provider} is not a 10-digit number")]
    InvalidNumber {
        provider: &'static str,
        number: String,
    },
    #[error("source map entry '{number}' for {provider} has an empty label")]
    EmptyLabel {
        provider: &'static str,
        number: String,
    },
}

/// Exact-match table from 10-digit tracking number to source label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    entries: HashMap<String, String>,
}

impl SourceMap {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(number, label)| (number.to_string(), label.to_string()))
                .collect(),
        }
    }

    /// Label for the number that was dialed, or [`UNKNOWN_SOURCE`].
    ///
    /// `to_number` is reduced to bare digits before the lookup; no other
    /// fuzzing is applied.
    pub fn classify(&self, to_number: &str) -> String {
        self.entries
            .get(&digits_only(to_number))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn validated(
        provider: &'static str,
        raw: HashMap<String, String>,
    ) -> Result<Self, SourceMapError> {
        let mut entries = HashMap::with_capacity(raw.len());
        for (number, label) in raw {
            let digits = digits_only(&number);
            if digits.len() != 10 {
                return Err(SourceMapError::InvalidNumber { provider, number });
            }
            if label.trim().is_empty() {
                return Err(SourceMapError::EmptyLabel { provider, number });
            }
            entries.insert(digits, label);
        }
        Ok(Self { entries })
    }
}

/// Source tables for every supported provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMaps {
    pub callrail: SourceMap,
    pub twilio: SourceMap,
}

#[derive(Debug, Deserialize)]
struct SourceMapFile {
    #[serde(default)]
    callrail: Option<HashMap<String, String>>,
    #[serde(default)]
    twilio: Option<HashMap<String, String>>,
}

impl SourceMaps {
    /// Tables compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            callrail: SourceMap::from_pairs(CALLRAIL_SOURCES.iter().copied()),
            twilio: SourceMap::from_pairs(TWILIO_SOURCES.iter().copied()),
        }
    }

    /// Loads tables from a JSON file shaped as
    /// `{"callrail": {"<number>": "<label>"}, "twilio": {...}}`.
    ///
    /// A provider missing from the file keeps its built-in table.
    pub fn from_json_file(path: &Path) -> Result<Self, SourceMapError> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| SourceMapError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json_str(&contents).map_err(|err| match err {
            SourceMapError::Parse { source, .. } => SourceMapError::Parse {
                path: display,
                source,
            },
            other => other,
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self, SourceMapError> {
        let file: SourceMapFile =
            serde_json::from_str(contents).map_err(|source| SourceMapError::Parse {
                path: "<inline>".to_string(),
                source,
            })?;

        let builtin = Self::builtin();
        Ok(Self {
            callrail: match file.callrail {
                Some(raw) => SourceMap::validated(ProviderKind::CallRail.slug(), raw)?,
                None => builtin.callrail,
            },
            twilio: match file.twilio {
                Some(raw) => SourceMap::validated(ProviderKind::Twilio.slug(), raw)?,
                None => builtin.twilio,
            },
        })
    }

    /// Built-in tables, or the file at `path` when one is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, SourceMapError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn for_provider(&self, provider: ProviderKind) -> &SourceMap {
        match provider {
            ProviderKind::CallRail => &self.callrail,
            ProviderKind::Twilio => &self.twilio,
        }
    }

    /// Classify `to_number` against `provider`'s table.
    pub fn classify(&self, provider: ProviderKind, to_number: &str) -> String {
        self.for_provider(provider).classify(to_number)
    }
}

impl Default for SourceMaps {
    fn default() -> Self {
        Self::builtin()
    }
}
