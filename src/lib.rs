//! # qirust-rounded
//!
//! A Rust library for rendering QR codes as SVG, with rounded modules and an optional logo
//! cutout.
//!
//! `qirust-rounded` turns text into a QR Code symbol (through the `qrcode` crate by default)
//! and draws it as a single SVG path in a fixed 1000×1000 viewport. Adjacent dark modules are
//! merged into smooth blobs and inner corners get matching fillets, all from each module's
//! 3x3 neighborhood.
//!
//! ## Features
//!
//! - Version escalation: the smallest version from a given minimum that holds the payload.
//! - Four error correction levels: L, M, Q, H.
//! - Corner rounding from 0 (square grid) to 100 (half-module radius).
//! - Centered cutout mask sized to the module grid, with optional embedded content.
//! - Background color and pass-through attributes on the root `<svg>` element.
//! - Options loadable from JSON.
//!
//! ## Example
//!
//! ```rust
//! use qirust_rounded::{helper::render, options::RenderOptions};
//!
//! let options = RenderOptions {
//!     color: "#1d3557".to_owned(),
//!     background_color: Some("#ffffff".to_owned()),
//!     cutout: true,
//!     cutout_element: Some("<img src=\"logo.png\" width=\"100%\"/>".to_owned()),
//!     rounding: 100.0,
//!     ..RenderOptions::default()
//! };
//!
//! let svg = render("https://example.com", &options).expect("valid options");
//! assert!(svg.contains("<foreignObject"));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Symbol data model, encoder seam and version escalation.
//! - [`path`]: Module-by-module SVG path compilation.
//! - [`cutout`]: Cutout region geometry.
//! - [`options`]: Rendering configuration.
//! - [`helper`]: SVG document composition.
//! - [`error`]: Error types.

#![forbid(unsafe_code)]

pub mod cutout;
pub mod error;
pub mod helper;
pub mod options;
pub mod path;
pub mod qrcode;

/// Side length of the logical coordinate space every path coordinate is expressed in.
pub const VIEWPORT_SIZE: f64 = 1000.0;

pub use crate::error::{EncodeError, Error, OptionsError};
pub use crate::helper::{render, to_svg_string, QrRenderer};
pub use crate::options::RenderOptions;
pub use crate::qrcode::{build_symbol, Encoder, ModuleGrid, QrCodeEcc, QrSymbol, QrcodeEncoder, Version};
