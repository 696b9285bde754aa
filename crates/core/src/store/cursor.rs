//! Forward scan cursors

use crate::error::StoreError;
use crate::types::AgencyRecord;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// Position after a specific record in the `(name, id)` scan order
///
/// Stores resume strictly after this position. The token form
/// ([`Cursor::encode`]) lets a cursor be persisted and handed back later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "n")]
    name: String,
    #[serde(rename = "i")]
    id: String,
}

impl Cursor {
    pub fn new<N: Into<String>, I: Into<String>>(name: N, id: I) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Cursor positioned just after `record`
    pub fn after(record: &AgencyRecord) -> Self {
        Self::new(record.name.clone(), record.id.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Opaque URL-safe token
    ///
    /// # Examples
    ///
    /// ```
    /// use agency_core::store::Cursor;
    ///
    /// let cursor = Cursor::new("Acme", "a1");
    /// let token = cursor.encode();
    /// assert_eq!(Cursor::decode(&token).unwrap(), cursor);
    /// ```
    pub fn encode(&self) -> String {
        // Serializing two strings cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Parses a token produced by [`Cursor::encode`]
    pub fn decode(token: &str) -> Result<Self, StoreError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| StoreError::malformed(format!("invalid cursor token: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::malformed(format!("invalid cursor payload: {}", e)))
    }
}
