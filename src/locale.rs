//! Bilingual display text.

use serde::{Deserialize, Serialize};

/// A display string carried in both supported locales.
///
/// The engine never picks a locale itself; consumers render whichever
/// side they need.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub ar: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }
}
