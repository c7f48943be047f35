//! Telephony provider adapters
//!
//! This module provides:
//! - The `ProviderAdapter` trait describing what differs between providers
//! - The CallRail and Twilio adapters
//! - A registry mapping webhook route slugs to adapters

pub mod callrail;
pub mod registry;
pub mod trait_;
pub mod twilio;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use callrail::CallRailAdapter;
pub use registry::{ProviderRegistry, RegistryError};
pub use trait_::{CallEvent, HistorySource, ProviderAdapter};
pub use twilio::TwilioAdapter;

/// Supported call-tracking providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    CallRail,
    Twilio,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::CallRail, ProviderKind::Twilio];

    /// Route slug and value stored in `call_logs.provider`.
    pub const fn slug(self) -> &'static str {
        match self {
            ProviderKind::CallRail => "callrail",
            ProviderKind::Twilio => "twilio",
        }
    }

    /// Name used in audit log delimiters.
    pub const fn display_name(self) -> &'static str {
        match self {
            ProviderKind::CallRail => "CallRail",
            ProviderKind::Twilio => "Twilio",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ProviderKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistryError::ProviderNotFound {
                name: s.to_string(),
            })
    }
}
