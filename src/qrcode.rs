//! QR symbol construction.
//!
//! This module owns the data model the path compiler reads from: the [`Version`] and
//! [`QrCodeEcc`] value types, the [`ModuleMatrix`] produced by an [`Encoder`], and the
//! immutable [`QrSymbol`] returned by [`build_symbol`]. Encoding itself is delegated to an
//! [`Encoder`] implementation; [`QrcodeEncoder`] is the default one.
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{EncodeError, OptionsError};

/// Read access to a square grid of dark and light modules.
///
/// Coordinates are signed so that callers may probe one step past any edge. Implementations
/// must return `false` for every coordinate outside `[0, module_count)`.
pub trait ModuleGrid {
    /// The width and height of the grid, measured in modules.
    fn module_count(&self) -> usize;

    /// Returns `true` for a dark module, `false` for a light or out-of-range one.
    fn is_dark(&self, row: i32, col: i32) -> bool;
}

/// A square matrix of modules as produced by an encoder, stored row-major.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ModuleMatrix {
    size: usize,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    /// Creates a matrix from row-major module values.
    ///
    /// # Panics
    ///
    /// Panics if `modules.len()` is not `size * size`.
    pub fn new(size: usize, modules: Vec<bool>) -> Self {
        assert_eq!(modules.len(), size * size, "Module count does not match matrix size");
        Self { size, modules }
    }

    /// Creates a matrix by evaluating `dark(row, col)` for every module.
    pub fn from_fn<F>(size: usize, mut dark: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut modules = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                modules.push(dark(row, col));
            }
        }
        Self { size, modules }
    }

    /// Returns the width and height of this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    fn get_module_bounded(&self, row: usize, col: usize) -> bool {
        assert!(row < self.size && col < self.size);
        self.modules[row * self.size + col]
    }
}

impl ModuleGrid for ModuleMatrix {
    fn module_count(&self) -> usize {
        self.size
    }

    fn is_dark(&self, row: i32, col: i32) -> bool {
        let in_range = |v: i32| usize::try_from(v).map_or(false, |v| v < self.size);
        in_range(row) && in_range(col) && self.get_module_bounded(row as usize, col as usize)
    }
}

/// A built QR Code symbol. Immutable once returned by [`build_symbol`].
///
/// # Example
///
/// ```rust
/// use qirust_rounded::qrcode::{build_symbol, ModuleGrid, QrCodeEcc, QrcodeEncoder};
///
/// let qr = build_symbol(&QrcodeEncoder, "HELLO", QrCodeEcc::Quartile, 1)
///     .unwrap()
///     .expect("HELLO fits in a version 1 symbol");
///
/// assert_eq!(qr.module_count(), 4 * qr.version().value() as usize + 17);
/// assert!(!qr.is_dark(-1, 0));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QrSymbol {
    text: String,
    level: QrCodeEcc,
    version: Version,
    matrix: ModuleMatrix,
}

impl QrSymbol {
    /// The text this symbol encodes.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns this symbol's error correction level.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.level
    }

    /// Returns this symbol's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// The module matrix backing this symbol.
    pub fn matrix(&self) -> &ModuleMatrix {
        &self.matrix
    }
}

impl ModuleGrid for QrSymbol {
    fn module_count(&self) -> usize {
        self.matrix.module_count()
    }

    fn is_dark(&self, row: i32, col: i32) -> bool {
        self.matrix.is_dark(row, col)
    }
}

/// The capability that turns text into a module matrix at one fixed version.
///
/// Implementations report a payload that is too large for `version` with
/// [`EncodeError::CapacityExceeded`]; any other error is treated as fatal.
pub trait Encoder {
    /// Encodes `text` at exactly `version` and `level`.
    fn encode(&self, version: Version, level: QrCodeEcc, text: &str) -> Result<ModuleMatrix, EncodeError>;
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn encode(&self, version: Version, level: QrCodeEcc, text: &str) -> Result<ModuleMatrix, EncodeError> {
        (**self).encode(version, level, text)
    }
}

/// [`Encoder`] backed by the `qrcode` crate. Text is encoded from its UTF-8 bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrcodeEncoder;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct QrcodeFault(::qrcode::types::QrError);

impl Encoder for QrcodeEncoder {
    fn encode(&self, version: Version, level: QrCodeEcc, text: &str) -> Result<ModuleMatrix, EncodeError> {
        use ::qrcode::types::QrError;

        let code = ::qrcode::QrCode::with_version(
            text.as_bytes(),
            ::qrcode::types::Version::Normal(i16::from(version.value())),
            level.into(),
        )
        .map_err(|err| match err {
            QrError::DataTooLong => EncodeError::CapacityExceeded { version },
            other => EncodeError::fault(QrcodeFault(other)),
        })?;

        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == ::qrcode::types::Color::Dark)
            .collect();
        Ok(ModuleMatrix::new(code.width(), modules))
    }
}

/// Encodes `text` at the smallest version, starting from `min_version`, that holds it.
///
/// A `min_version` of 0 is treated as 1. Returns `Ok(None)` when no version up to
/// [`Version::MAX`] can hold the payload at `level`; callers should render nothing in that
/// case. Encoder failures other than [`EncodeError::CapacityExceeded`] are returned as-is.
pub fn build_symbol<E: Encoder + ?Sized>(
    encoder: &E,
    text: &str,
    level: QrCodeEcc,
    min_version: u8,
) -> Result<Option<QrSymbol>, EncodeError> {
    let start = min_version.max(Version::MIN.value());
    for ver in start..=Version::MAX.value() {
        let version = Version::new(ver);
        match encoder.encode(version, level, text) {
            Ok(matrix) => {
                debug!(version = ver, ecc = %level, modules = matrix.size(), "built QR symbol");
                return Ok(Some(QrSymbol {
                    text: text.to_owned(),
                    level,
                    version,
                    matrix,
                }));
            }
            Err(EncodeError::CapacityExceeded { .. }) => {
                trace!(version = ver, ecc = %level, "payload over capacity, trying next version");
            }
            Err(err) => return Err(err),
        }
    }
    warn!(len = text.len(), ecc = %level, "payload does not fit in any QR version");
    Ok(None)
}

#[derive(Debug)]
struct CacheEntry {
    text: String,
    level: QrCodeEcc,
    symbol: Option<QrSymbol>,
}

/// Single-entry memo of the last symbol built, keyed by text and level.
///
/// Rebuilds whenever either key changes. An exhausted result (`None`) is cached too.
#[derive(Debug, Default)]
pub struct SymbolCache {
    entry: Option<CacheEntry>,
}

impl SymbolCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol for `(text, level)`, building it only on a key change.
    pub fn get_or_build<E: Encoder + ?Sized>(
        &mut self,
        encoder: &E,
        text: &str,
        level: QrCodeEcc,
    ) -> Result<Option<&QrSymbol>, EncodeError> {
        let hit = matches!(&self.entry, Some(entry) if entry.text == text && entry.level == level);
        if hit {
            debug!(ecc = %level, "symbol cache hit");
        } else {
            let symbol = build_symbol(encoder, text, level, Version::MIN.value())?;
            self.entry = Some(CacheEntry {
                text: text.to_owned(),
                level,
                symbol,
            });
        }
        Ok(self.entry.as_ref().and_then(|entry| entry.symbol.as_ref()))
    }

    /// Drops the memoized symbol.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    #[serde(rename = "L")]
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[serde(rename = "M")]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    #[default]
    #[serde(rename = "Q")]
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    #[serde(rename = "H")]
    High,
}

impl QrCodeEcc {
    /// Returns the single-letter name of this level.
    pub fn as_str(self) -> &'static str {
        use QrCodeEcc::*;
        match self {
            Low => "L",
            Medium => "M",
            Quartile => "Q",
            High => "H",
        }
    }
}

impl fmt::Display for QrCodeEcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrCodeEcc {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use QrCodeEcc::*;
        match s.trim() {
            "L" | "l" => Ok(Low),
            "M" | "m" => Ok(Medium),
            "Q" | "q" => Ok(Quartile),
            "H" | "h" => Ok(High),
            other => Err(OptionsError::UnknownLevel(other.to_owned())),
        }
    }
}

impl From<QrCodeEcc> for ::qrcode::types::EcLevel {
    fn from(level: QrCodeEcc) -> Self {
        match level {
            QrCodeEcc::Low => ::qrcode::types::EcLevel::L,
            QrCodeEcc::Medium => ::qrcode::types::EcLevel::M,
            QrCodeEcc::Quartile => ::qrcode::types::EcLevel::Q,
            QrCodeEcc::High => ::qrcode::types::EcLevel::H,
        }
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Like [`Version::new`], but returns `None` instead of panicking.
    pub const fn checked(ver: u8) -> Option<Self> {
        if Version::MIN.value() <= ver && ver <= Version::MAX.value() {
            Some(Self(ver))
        } else {
            None
        }
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the width of a symbol of this version, `4 * version + 17`.
    pub const fn module_count(self) -> usize {
        (self.0 as usize) * 4 + 17
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
