//! Reduce the color histogram of an image to a few perceptually distinct colors,
//! and optionally snap those colors onto a catalog of reference swatches.
//!
//! # Examples
//!
//! ## Get the 3 main colors of an image, ignoring its background.
//!
//! ```no_run
//! use colorbuckets::{Color, ColorCollection, HistogramSource, ReduceOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = image::open("some image")?.into_rgb8();
//! let [red, green, blue] = image.get_pixel(0, 0).0;
//! let background = ColorCollection::try_from_colors([Color::new(red, green, blue)])?;
//!
//! let palette = colorbuckets::reduce(image.histogram(), &background, &ReduceOptions::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Map the colors onto the built-in ColorBrewer swatches.
//!
//! ```
//! use colorbuckets::{Color, ColorCollection, Normalizer};
//!
//! # fn main() -> colorbuckets::Result<()> {
//! let colors = ColorCollection::try_from_colors([
//! 	Color::new(250, 250, 250).with_weight(40),
//! 	Color::new(200, 30, 30).with_weight(10),
//! ])?;
//!
//! let normalized = Normalizer::default().normalize(&colors, false);
//! assert_eq!(normalized.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! [`reduce`] performs the following steps on a pixel histogram:
//!
//! 1. Remove the background colors.
//! 2. Sort by descending weight, so that the most common colors absorb similar ones.
//! 3. Greedily combine colors whose normalized RGB distance is below the threshold.
//! 4. Sort by descending weight again, since merged weights change the order.
//! 5. Keep only the heaviest colors.
//!
//! The merge is greedy and depends on the order of the colors,
//! so the result is not an optimal clustering.
//! It is, however, deterministic for the same input.
//!
//! [`Normalizer::normalize`] then maps each remaining color onto the swatch
//! with the smallest CIEDE2000 difference, skipping swatches that were already chosen.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unreadable_literal)]

mod error;
pub use error::{Error, Result};

pub mod color;
pub use color::{Color, Footprint};

pub mod difference;

pub mod collection;
pub use collection::ColorCollection;

pub mod catalog;
pub use catalog::{MappedColor, Normalizer, Swatch, SwatchCatalog, SwatchId};

pub mod source;
pub use source::{HistogramSource, RasterWriter};

/// Parameters for [`reduce`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReduceOptions {
	/// Colors closer than this normalized RGB distance to a heavier color are combined with it.
	///
	/// Must be in `0.0..=1.0`.
	pub threshold: f64,
	/// Whether combined colors add their weight to the color that absorbed them
	pub merge_weights: bool,
	/// The maximum number of colors to keep
	pub max_colors: usize,
}

impl Default for ReduceOptions {
	fn default() -> Self {
		Self {
			threshold: 0.15,
			merge_weights: true,
			max_colors: 3,
		}
	}
}

/// Reduce `colors` to at most `options.max_colors` distinct colors, heaviest first.
///
/// Every color of `background` is removed beforehand.
///
/// # Errors
/// Returns [`Error::Validation`] if `options.threshold` is not in `0.0..=1.0`.
pub fn reduce(mut colors: ColorCollection, background: &ColorCollection, options: &ReduceOptions) -> Result<ColorCollection> {
	let ReduceOptions { threshold, merge_weights, max_colors } = *options;

	let unique = colors.len();

	colors
		.remove_colors(background)
		.sort_by_weight_desc()
		.combine_similar(merge_weights, threshold)?
		.sort_by_weight_desc()
		.limit(max_colors);

	tracing::debug!(unique, kept = colors.len(), "reduced colors");

	Ok(colors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;

	fn collection(colors: &[(u8, u8, u8, u64)]) -> ColorCollection {
		ColorCollection::try_from_colors(colors.iter().map(|&(r, g, b, w)| Color::new(r, g, b).with_weight(w))).unwrap()
	}

	#[test]
	fn reduce_runs_the_whole_pipeline() {
		let colors = collection(&[
			(255, 255, 255, 500), // background
			(10, 10, 200, 40),
			(200, 10, 10, 100),
			(205, 12, 8, 30),
			(10, 200, 10, 50),
			(90, 90, 90, 5),
		]);
		let background = collection(&[(255, 255, 255, 0), (1, 2, 3, 0)]);

		let reduced = reduce(colors, &background, &ReduceOptions::default()).unwrap();
		let reduced = reduced.iter().copied().collect::<Vec<_>>();

		assert_eq!(
			reduced,
			vec![
				Color::new(200, 10, 10).with_weight(130),
				Color::new(10, 200, 10).with_weight(50),
				Color::new(10, 10, 200).with_weight(40),
			]
		);
	}

	#[test]
	fn reduce_without_merging_weights() {
		let colors = collection(&[(0, 0, 0, 10), (5, 5, 5, 20), (250, 250, 250, 15)]);
		let options = ReduceOptions { merge_weights: false, max_colors: 10, ..ReduceOptions::default() };

		let reduced = reduce(colors, &ColorCollection::new(), &options).unwrap();
		let reduced = reduced.iter().copied().collect::<Vec<_>>();

		assert_eq!(reduced, vec![Color::new(5, 5, 5).with_weight(20), Color::new(250, 250, 250).with_weight(15)]);
	}

	#[test]
	fn reduce_rejects_invalid_threshold() {
		let options = ReduceOptions { threshold: 2.0, ..ReduceOptions::default() };
		let err = reduce(collection(&[(1, 1, 1, 1)]), &ColorCollection::new(), &options).unwrap_err();
		assert!(err.is_validation());
	}

	#[test]
	fn reduce_then_normalize() {
		let colors = collection(&[(250, 250, 250, 50), (240, 240, 240, 40), (3, 3, 3, 10)]);
		let options = ReduceOptions { threshold: 0.01, ..ReduceOptions::default() };

		let reduced = reduce(colors, &ColorCollection::new(), &options).unwrap();
		assert_eq!(reduced.len(), 3);

		let normalized = Normalizer::default().normalize(&reduced, true);
		for color in &normalized {
			assert!(SwatchCatalog::default_catalog().find(color.footprint()).is_some());
		}
		assert_eq!(normalized.iter().last().unwrap(), &Color::new(0, 0, 0).with_weight(168));
	}
}
