use crate::cutout::CutoutRegion;
use crate::error::Error;
use crate::options::{is_attribute_name, RenderOptions};
use crate::path::{clamp_rounding, compile};
use crate::qrcode::{build_symbol, Encoder, ModuleGrid, QrSymbol, QrcodeEncoder, SymbolCache, Version};
use crate::VIEWPORT_SIZE;

use tracing::{debug, warn};

/*---- Utilities ----*/

// Escapes the XML special characters for use in attribute values.
fn xml_escape(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for ch in input.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			other => out.push(other),
		}
	}
	out
}

/// Returns a string of SVG code for the given QR Code symbol.
///
/// The document uses a fixed `0 0 1000 1000` viewBox, so it scales to any display size.
/// Elements are emitted in paint order: the optional background, the cutout mask, the
/// module path and finally the cutout content. A missing symbol (payload too long for the
/// chosen level) renders as an empty string. Pass-through attributes whose names are not
/// valid XML names, or that collide with `xmlns` / `viewBox`, are dropped.
///
/// The string always uses Unix newlines (\n), regardless of the platform.
///
/// # Example
///
/// ```
/// use qirust_rounded::helper::to_svg_string;
/// use qirust_rounded::options::RenderOptions;
/// use qirust_rounded::qrcode::{build_symbol, QrCodeEcc, QrcodeEncoder};
///
/// let qr = build_symbol(&QrcodeEncoder, "Hello, World!", QrCodeEcc::Quartile, 1).unwrap();
/// let options = RenderOptions { rounding: 100.0, cutout: true, ..RenderOptions::default() };
/// let svg = to_svg_string(qr.as_ref(), &options);
/// assert!(svg.contains("<mask id=\"qr-rounded__mask\">"));
/// ```
pub fn to_svg_string(qr: Option<&QrSymbol>, options: &RenderOptions) -> String {
	let Some(qr) = qr else {
		return String::new();
	};

	let rounding = clamp_rounding(options.rounding);
	let cutout = CutoutRegion::compute(qr.module_count());
	let mask_id = xml_escape(&options.mask_id);

	let mut result = String::new();
	result += &format!(
		"<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {0} {0}\"", VIEWPORT_SIZE);
	for (name, value) in &options.attributes {
		if !is_attribute_name(name) {
			warn!(attribute = %name, "dropping invalid presentation attribute");
			continue;
		}
		result += &format!(" {}=\"{}\"", name, xml_escape(value));
	}
	result += ">\n";

	if let Some(background) = &options.background_color {
		result += &format!(
			"\t<rect x=\"0\" y=\"0\" width=\"{0}\" height=\"{0}\" fill=\"{1}\"/>\n",
			VIEWPORT_SIZE, xml_escape(background));
	}

	if options.cutout {
		result += &format!("\t<mask id=\"{}\">\n", mask_id);
		result += &format!(
			"\t\t<rect x=\"0\" y=\"0\" width=\"{0}\" height=\"{0}\" fill=\"#fff\"/>\n", VIEWPORT_SIZE);
		result += &format!(
			"\t\t<rect x=\"{0}\" y=\"{0}\" width=\"{1}\" height=\"{1}\" rx=\"{2}\" ry=\"{2}\" fill=\"#000\"/>\n",
			cutout.position, cutout.size, rounding);
		result += "\t</mask>\n";
	}

	result += &format!(
		"\t<path fill=\"{}\" d=\"{}\"",
		xml_escape(&options.color), compile(Some(qr), rounding));
	if options.cutout {
		result += &format!(" mask=\"url(#{})\"", mask_id);
	}
	result += "/>\n";

	if let Some(content) = &options.cutout_element {
		result += &format!(
			"\t<foreignObject x=\"{0}\" y=\"{0}\" width=\"{1}\" height=\"{1}\">\n",
			cutout.position, cutout.size);
		result += &format!(
			"\t\t<div xmlns=\"http://www.w3.org/1999/xhtml\" style=\"display:flex;justify-content:center;align-items:center;height:100%;width:100%;overflow:hidden;border-radius:{}px\">{}</div>\n",
			rounding, content);
		result += "\t</foreignObject>\n";
	}

	result += "</svg>\n";
	result
}

/// Encodes `content` with the default encoder and renders it to SVG.
///
/// Returns an empty string when the content does not fit in any version at the requested
/// error correction level.
///
/// # Example
///
/// ```
/// use qirust_rounded::helper::render;
/// use qirust_rounded::options::RenderOptions;
///
/// let options = RenderOptions::default().with_attribute("width", "256");
/// let svg = render("Hello, World!", &options).unwrap();
/// assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1000 1000\" width=\"256\">"));
/// ```
pub fn render(content: &str, options: &RenderOptions) -> Result<String, Error> {
	render_with(&QrcodeEncoder, content, options)
}

/// Like [`render`], with a caller-supplied encoder.
pub fn render_with<E: Encoder + ?Sized>(encoder: &E, content: &str, options: &RenderOptions) -> Result<String, Error> {
	options.validate()?;
	let qr = build_symbol(encoder, content, options.error_correction_level, Version::MIN.value())?;
	Ok(to_svg_string(qr.as_ref(), options))
}

/// Renders repeatedly, re-encoding only when the content or the error correction level
/// changes. Color, rounding and cutout changes reuse the cached symbol.
#[derive(Debug, Default)]
pub struct QrRenderer<E = QrcodeEncoder> {
	encoder: E,
	cache: SymbolCache,
}

impl QrRenderer<QrcodeEncoder> {
	/// Creates a renderer backed by [`QrcodeEncoder`].
	pub fn new() -> Self {
		Self::default()
	}
}

impl<E: Encoder> QrRenderer<E> {
	/// Creates a renderer backed by the given encoder.
	pub fn with_encoder(encoder: E) -> Self {
		Self { encoder, cache: SymbolCache::new() }
	}

	/// Validates `options` and renders `content`, reusing the last symbol when possible.
	pub fn render(&mut self, content: &str, options: &RenderOptions) -> Result<String, Error> {
		options.validate()?;
		let qr = self.cache.get_or_build(&self.encoder, content, options.error_correction_level)?;
		if qr.is_none() {
			debug!("nothing to render");
		}
		Ok(to_svg_string(qr, options))
	}
}

// Tests
#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::EncodeError;
	use crate::qrcode::{ModuleMatrix, QrCodeEcc};
	use proptest::prelude::*;
	use std::cell::Cell;

	fn hello() -> QrSymbol {
		build_symbol(&QrcodeEncoder, "HELLO WORLD", QrCodeEcc::Quartile, 1).unwrap().unwrap()
	}

	fn path_data(svg: &str) -> &str {
		let start = svg.find(" d=\"").expect("path element") + 4;
		let len = svg[start..].find('"').unwrap();
		&svg[start..start + len]
	}

	struct CountingEncoder {
		calls: Cell<u32>,
	}

	impl Encoder for CountingEncoder {
		fn encode(&self, version: Version, level: QrCodeEcc, text: &str) -> Result<ModuleMatrix, EncodeError> {
			self.calls.set(self.calls.get() + 1);
			QrcodeEncoder.encode(version, level, text)
		}
	}

	#[derive(Debug, thiserror::Error)]
	#[error("encoder offline")]
	struct Offline;

	struct OfflineEncoder;

	impl Encoder for OfflineEncoder {
		fn encode(&self, _: Version, _: QrCodeEcc, _: &str) -> Result<ModuleMatrix, EncodeError> {
			Err(EncodeError::fault(Offline))
		}
	}

	#[test]
	fn test_missing_symbol_renders_nothing() {
		assert_eq!(to_svg_string(None, &RenderOptions::default()), "");
		let text = "9".repeat(8000);
		let options = RenderOptions { error_correction_level: QrCodeEcc::High, ..RenderOptions::default() };
		assert_eq!(render(&text, &options).unwrap(), "");
	}

	#[test]
	fn test_plain_document() {
		let svg = to_svg_string(Some(&hello()), &RenderOptions::default());
		assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1000 1000\">\n"));
		assert!(svg.ends_with("</svg>\n"));
		assert!(svg.contains("<path fill=\"#000\" d=\"M "));
		assert!(!svg.contains("<mask"));
		assert!(!svg.contains("mask=\""));
		assert!(!svg.contains("<rect"));
		assert!(!svg.contains("foreignObject"));
	}

	#[test]
	fn test_background_and_mask() {
		let options = RenderOptions {
			background_color: Some("#fafafa".into()),
			cutout: true,
			rounding: 40.0,
			mask_id: "logo".into(),
			..RenderOptions::default()
		};
		let svg = to_svg_string(Some(&hello()), &options);
		let background = svg.find("fill=\"#fafafa\"").unwrap();
		let mask = svg.find("<mask id=\"logo\">").unwrap();
		let path = svg.find("<path").unwrap();
		assert!(background < mask && mask < path);
		assert!(svg.contains("rx=\"40\" ry=\"40\" fill=\"#000\""));
		assert!(svg.contains(" mask=\"url(#logo)\"/>"));
	}

	#[test]
	fn test_cutout_element_covers_cutout() {
		let qr = hello();
		let region = CutoutRegion::compute(qr.module_count());
		let options = RenderOptions {
			cutout: true,
			cutout_element: Some("<img src=\"logo.png\"/>".into()),
			rounding: 25.0,
			..RenderOptions::default()
		};
		let svg = to_svg_string(Some(&qr), &options);
		let expected = format!(
			"<foreignObject x=\"{0}\" y=\"{0}\" width=\"{1}\" height=\"{1}\">",
			region.position, region.size);
		assert!(svg.contains(&expected));
		assert!(svg.contains("border-radius:25px\"><img src=\"logo.png\"/></div>"));
		assert!(svg.find("<path").unwrap() < svg.find("<foreignObject").unwrap());
	}

	#[test]
	fn test_attributes_are_escaped() {
		let options = RenderOptions::default()
			.with_attribute("aria-label", "Tom & \"Jerry\"")
			.with_attribute("class", "qr");
		let svg = to_svg_string(Some(&hello()), &options);
		assert!(svg.contains(" aria-label=\"Tom &amp; &quot;Jerry&quot;\" class=\"qr\">"));
	}

	#[test]
	fn test_invalid_attribute_names_are_dropped() {
		let options = RenderOptions::default()
			.with_attribute("onload=\"alert(1)\" x", "y")
			.with_attribute("viewBox", "0 0 1 1")
			.with_attribute("width", "128");
		let svg = to_svg_string(Some(&hello()), &options);
		assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1000 1000\" width=\"128\">\n"));
		assert!(!svg.contains("onload"));
		assert!(!svg.contains("0 0 1 1"));
	}

	#[test]
	fn test_render_rejects_bad_options() {
		let options = RenderOptions { rounding: 120.0, ..RenderOptions::default() };
		assert!(matches!(render("x", &options), Err(Error::Options(_))));
	}

	#[test]
	fn test_render_propagates_encoder_fault() {
		let err = render_with(&OfflineEncoder, "x", &RenderOptions::default()).unwrap_err();
		assert!(matches!(err, Error::Encode(EncodeError::Fault(_))));
		assert_eq!(err.to_string(), "encoder offline");
	}

	#[test]
	fn test_renderer_reuses_symbol() {
		let mut renderer = QrRenderer::with_encoder(CountingEncoder { calls: Cell::new(0) });
		let first = renderer.render("HELLO", &RenderOptions::default()).unwrap();
		let calls = renderer.encoder.calls.get();
		assert!(calls >= 1);

		let recolored = RenderOptions { color: "red".into(), rounding: 80.0, ..RenderOptions::default() };
		let second = renderer.render("HELLO", &recolored).unwrap();
		assert_eq!(renderer.encoder.calls.get(), calls);
		assert_ne!(first, second);

		let higher = RenderOptions { error_correction_level: QrCodeEcc::High, ..RenderOptions::default() };
		renderer.render("HELLO", &higher).unwrap();
		assert!(renderer.encoder.calls.get() > calls);
	}

	#[test]
	fn test_renderer_default_encoder() {
		let mut renderer = QrRenderer::new();
		let svg = renderer.render("HELLO", &RenderOptions::default()).unwrap();
		assert_eq!(svg, render("HELLO", &RenderOptions::default()).unwrap());
	}

	proptest! {
		#[test]
		fn colors_do_not_change_path(
			color in "#[0-9a-f]{6}",
			background in proptest::option::of("#[0-9a-f]{6}"),
			rounding in 0.0f64..=100.0,
		) {
			let qr = hello();
			let base = RenderOptions { rounding, ..RenderOptions::default() };
			let painted = RenderOptions { color, background_color: background, ..base.clone() };
			let a = to_svg_string(Some(&qr), &base);
			let b = to_svg_string(Some(&qr), &painted);
			prop_assert_eq!(path_data(&a), path_data(&b));
		}
	}
}
