//! Typed identifiers for experiments and runs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random (v4) identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// True for the nil UUID, which stands for "no identifier".
            #[must_use]
            pub const fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            /// Reject the nil identifier.
            ///
            /// # Errors
            ///
            /// Returns [`Error::Validation`] if the identifier is nil.
            pub fn ensure_valid(self) -> Result<Self> {
                if self.is_nil() {
                    return Err(Error::Validation(
                        concat!($label, " id must not be empty").to_string(),
                    ));
                }
                Ok(self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(Error::Validation(
                        concat!($label, " id must not be empty").to_string(),
                    ));
                }
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| Error::Validation(format!(concat!("invalid ", $label, " id '{}': {}"), s, e)))
            }
        }
    };
}

define_id!(
    /// Identifier of an [`Experiment`](super::Experiment).
    ExperimentId,
    "experiment"
);

define_id!(
    /// Identifier of a [`Run`](super::Run).
    RunId,
    "run"
);
