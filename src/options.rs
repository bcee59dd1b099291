//! Rendering configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::qrcode::QrCodeEcc;

/// Default id of the mask element emitted when a cutout is requested.
pub const DEFAULT_MASK_ID: &str = "qr-rounded__mask";

/// How a QR code is painted.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use qirust_rounded::options::RenderOptions;
/// use qirust_rounded::qrcode::QrCodeEcc;
///
/// let options = RenderOptions::from_json(r#"{ "rounding": 60, "error_correction_level": "H" }"#).unwrap();
/// assert_eq!(options.rounding, 60.0);
/// assert_eq!(options.error_correction_level, QrCodeEcc::High);
/// assert_eq!(options.color, "#000");
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Fill color of the dark modules.
    pub color: String,
    /// Fill for the whole canvas behind the code. Transparent when absent.
    pub background_color: Option<String>,
    /// Mask out the center of the code so content can be placed there.
    pub cutout: bool,
    /// Markup placed over the cutout region, inside a `<foreignObject>`.
    /// Inserted verbatim; the caller is responsible for it being well-formed.
    pub cutout_element: Option<String>,
    /// Redundancy tier of the encoded symbol.
    pub error_correction_level: QrCodeEcc,
    /// Corner rounding from 0 (square modules) to 100 (half-module radius).
    pub rounding: f64,
    /// Id of the mask element, unique per document.
    pub mask_id: String,
    /// Extra attributes copied onto the root `<svg>` element, e.g. `width` or `class`.
    pub attributes: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: "#000".to_owned(),
            background_color: None,
            cutout: false,
            cutout_element: None,
            error_correction_level: QrCodeEcc::Quartile,
            rounding: 0.0,
            mask_id: DEFAULT_MASK_ID.to_owned(),
            attributes: BTreeMap::new(),
        }
    }
}

impl RenderOptions {
    /// Parses options from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Checks the options for values the renderer would otherwise have to guess about.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(0.0..=100.0).contains(&self.rounding) {
            return Err(OptionsError::RoundingOutOfRange(self.rounding));
        }
        if self.color.trim().is_empty() {
            return Err(OptionsError::EmptyColor);
        }
        if !is_xml_name(&self.mask_id) {
            return Err(OptionsError::InvalidMaskId(self.mask_id.clone()));
        }
        for name in self.attributes.keys() {
            if !is_attribute_name(name) {
                return Err(OptionsError::InvalidAttribute(name.clone()));
            }
        }
        Ok(())
    }

    /// Adds a pass-through attribute for the root `<svg>` element.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Attributes the renderer always writes itself.
const RESERVED_ATTRIBUTES: &[&str] = &["xmlns", "viewBox"];

/// Returns `true` if `name` may be written as a pass-through attribute on the root `<svg>`.
pub(crate) fn is_attribute_name(name: &str) -> bool {
    is_xml_name(name) && !RESERVED_ATTRIBUTES.contains(&name)
}

// Loose XML Name check: ASCII letters, digits, '-', '_', '.', ':' and no leading digit.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}
