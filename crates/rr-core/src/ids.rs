//! Strongly typed name wrappers.
//!
//! Graph nodes are keyed by name rather than by dense index: the static table
//! names its waypoints, and incident nodes are named after the incident they
//! stand for.  Both wrappers implement `Borrow<str>` so maps keyed by them can
//! be queried with a plain `&str`.

use std::borrow::Borrow;
use std::fmt;

/// Prefix shared by every incident pseudo-node name.
pub const INCIDENT_PREFIX: &str = "INCIDENT_";

/// Generate a typed wrapper around an owned `String`.
macro_rules! typed_name {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(String);

        impl $name {
            #[inline]
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

typed_name! {
    /// Name of a routing-graph node: a static waypoint or an incident node.
    pub struct NodeName;
}

typed_name! {
    /// Identifier of an incident as issued by the incident feed.
    pub struct IncidentId;
}

impl NodeName {
    /// Deterministic node name for an incident: `INCIDENT_<id>`.
    pub fn incident(id: &IncidentId) -> Self {
        Self(format!("{INCIDENT_PREFIX}{}", id.0))
    }

    /// `true` if this name belongs to an incident pseudo-node.
    #[inline]
    pub fn is_incident(&self) -> bool {
        self.0.starts_with(INCIDENT_PREFIX)
    }
}
