// 🎨 ColorService Entity - persisted holder of the user's color scheme
//
// The scheme lives in scheme_data as an encoded blob. Reading it back never
// fails outright: callers get a SchemeLoad telling them whether they're looking
// at the stored scheme, the default (nothing stored), or a fallback for corrupt data.

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};

use crate::errors::ThemeError;
use crate::theme::{self, ColorScheme};

// ============================================================================
// DECODE OUTCOME
// ============================================================================

#[derive(Debug)]
pub enum SchemeLoad {
    /// Stored data decoded cleanly
    Decoded(ColorScheme),

    /// Nothing stored yet, default light scheme
    Default(ColorScheme),

    /// Stored data could not be decoded; fallback is the default light scheme
    Corrupt {
        fallback: ColorScheme,
        error: ThemeError,
    },
}

impl SchemeLoad {
    /// The scheme to render, whatever the outcome
    pub fn scheme(&self) -> &ColorScheme {
        match self {
            SchemeLoad::Decoded(s) | SchemeLoad::Default(s) => s,
            SchemeLoad::Corrupt { fallback, .. } => fallback,
        }
    }

    pub fn into_scheme(self) -> ColorScheme {
        match self {
            SchemeLoad::Decoded(s) | SchemeLoad::Default(s) => s,
            SchemeLoad::Corrupt { fallback, .. } => fallback,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, SchemeLoad::Corrupt { .. })
    }
}

// ============================================================================
// COLOR SERVICE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorService {
    pub id: String,
    pub scheme_data: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

impl ColorService {
    /// Encode failures are logged and leave scheme_data empty (reads back as Default)
    pub fn new(scheme: &ColorScheme) -> Self {
        let scheme_data = match theme::encode(scheme) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Encoding color scheme '{}' failed: {}", scheme.name, e);
                Vec::new()
            }
        };

        ColorService {
            id: uuid::Uuid::new_v4().to_string(),
            scheme_data,
            updated_at: Utc::now(),
        }
    }

    pub fn scheme(&self) -> SchemeLoad {
        if self.scheme_data.is_empty() {
            return SchemeLoad::Default(ColorScheme::light());
        }

        match theme::decode(&self.scheme_data) {
            Ok(scheme) => SchemeLoad::Decoded(scheme),
            Err(error) => SchemeLoad::Corrupt {
                fallback: ColorScheme::light(),
                error,
            },
        }
    }

    /// On failure the stored data is left as it was
    pub fn set_scheme(&mut self, scheme: &ColorScheme) -> Result<(), ThemeError> {
        match theme::encode(scheme) {
            Ok(bytes) => {
                self.scheme_data = bytes;
                self.updated_at = Utc::now();
                Ok(())
            }
            Err(e) => {
                error!("Encoding color scheme '{}' failed: {}", scheme.name, e);
                Err(e)
            }
        }
    }
}

impl Default for ColorService {
    fn default() -> Self {
        ColorService::new(&ColorScheme::light())
    }
}
