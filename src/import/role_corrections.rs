//! Spelling fixes for role names typed into the spreadsheet by hand.

use std::{collections::HashMap, path::Path};

use crate::Error;

/// A lookup table from a misspelled role to its correct spelling.
///
/// The default table holds the one typo known to appear in the source
/// spreadsheets. More entries can be added from a JSON file with
/// [RoleCorrections::from_json_file].
#[derive(Debug, Clone, PartialEq)]
pub struct RoleCorrections {
    corrections: HashMap<String, String>,
}

impl Default for RoleCorrections {
    fn default() -> Self {
        Self {
            corrections: HashMap::from([(
                "Senir Associate".to_owned(),
                "Senior Associate".to_owned(),
            )]),
        }
    }
}

impl RoleCorrections {
    /// Add the corrections in `extra` to the default table.
    ///
    /// Entries in `extra` replace default entries with the same key.
    pub fn with_extra(extra: HashMap<String, String>) -> Self {
        let mut corrections = Self::default();
        corrections.corrections.extend(extra);
        corrections
    }

    /// Parse extra corrections from a JSON object such as
    /// `{"Mangaer": "Manager"}`.
    ///
    /// # Errors
    /// Returns [Error::InvalidRoleCorrections] if `json` is not an object whose
    /// values are all strings.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let extra: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|error| Error::InvalidRoleCorrections(error.to_string()))?;

        Ok(Self::with_extra(extra))
    }

    /// Read extra corrections from a JSON file.
    ///
    /// # Errors
    /// Returns [Error::InvalidRoleCorrections] if the file cannot be read or
    /// does not hold a JSON object of strings.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path).map_err(|error| {
            Error::InvalidRoleCorrections(format!("{}: {error}", path.display()))
        })?;

        Self::from_json(&json)
    }

    /// Return the corrected spelling of `role`, or `role` itself if it has no
    /// known correction.
    ///
    /// Only exact matches are corrected.
    pub fn correct(&self, role: String) -> String {
        match self.corrections.get(&role) {
            Some(corrected) => corrected.clone(),
            None => role,
        }
    }

    /// The number of corrections in the table.
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    /// Whether the table has no corrections.
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}
