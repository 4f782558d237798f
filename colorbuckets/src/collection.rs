//! An ordered collection of distinct colors and the operations used to reduce it

use crate::{
	difference::{ColorDifference, RgbDistance},
	Color, Error, Footprint, Result,
};
use palette::Srgb;
use std::collections::{HashMap, HashSet};

/// The number of pixels counted by each task in [`ColorCollection::from_pixels_par`]
#[cfg(feature = "threads")]
const CHUNK_SIZE: usize = 4096;

/// An ordered set of colors where no two colors share a [`Footprint`].
///
/// Colors iterate in insertion order unless the collection is explicitly re-sorted.
/// All reducing operations mutate the collection in place and return it again,
/// so that they can be chained:
///
/// ```
/// # use colorbuckets::{Color, ColorCollection};
/// # fn main() -> colorbuckets::Result<()> {
/// let mut colors = ColorCollection::new();
/// colors
/// 	.add(Color::new(255, 0, 0).with_weight(100))?
/// 	.add(Color::new(254, 1, 1).with_weight(50))?
/// 	.add(Color::new(0, 0, 255).with_weight(10))?;
///
/// colors.sort_by_weight_desc().combine_similar(true, 0.15)?.limit(2);
///
/// assert_eq!(colors.len(), 2);
/// assert_eq!(colors.total_weight(), 160);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorCollection {
	/// Colors in iteration order
	colors: Vec<Color>,
	/// Footprints of every color in `colors`
	footprints: HashSet<Footprint>,
}

/// Accumulates weights per footprint while remembering the order each footprint was first seen in
#[derive(Default)]
struct Tally {
	/// Colors in first seen order
	colors: Vec<Color>,
	/// Footprint -> index into `colors`
	index: HashMap<Footprint, usize>,
}

impl Tally {
	/// Add `color`, merging its weight into an already seen color with the same footprint
	fn count(&mut self, color: Color) -> Result<()> {
		let next = self.colors.len();
		let i = *self.index.entry(color.footprint()).or_insert(next);
		if i == next {
			self.colors.push(color);
		} else {
			self.colors[i].add_weight(color.weight())?;
		}
		Ok(())
	}

	/// Count one pixel of each color in `pixels`
	fn count_pixels(&mut self, pixels: &[Srgb<u8>]) {
		for &srgb in pixels {
			self.count(Color::from(srgb).with_weight(1))
				.expect("pixel counts are at most usize::MAX");
		}
	}

	/// Finish counting
	fn finish(self) -> ColorCollection {
		ColorCollection {
			footprints: self.index.into_keys().collect(),
			colors: self.colors,
		}
	}
}

impl ColorCollection {
	/// Create an empty collection
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a collection from `colors`, in order.
	///
	/// # Errors
	/// Returns [`Error::DuplicateColor`] on the first color whose footprint was already collected.
	pub fn try_from_colors(colors: impl IntoIterator<Item = Color>) -> Result<Self> {
		let mut collection = Self::new();
		for color in colors {
			collection.add(color)?;
		}
		Ok(collection)
	}

	/// Create a collection from `(color, count)` pairs of a histogram.
	///
	/// Repeated colors have their counts summed and keep the position of their first occurrence.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if the summed counts of a color overflow a `u64`.
	pub fn from_histogram(histogram: impl IntoIterator<Item = (Srgb<u8>, u64)>) -> Result<Self> {
		let mut tally = Tally::default();
		for (srgb, count) in histogram {
			tally.count(Color::from(srgb).with_weight(count))?;
		}
		Ok(tally.finish())
	}

	/// Count the pixels of each distinct color.
	///
	/// Colors are ordered by their first occurrence in `pixels`,
	/// and the weight of each color is its number of pixels.
	#[must_use]
	pub fn from_pixels(pixels: &[Srgb<u8>]) -> Self {
		let mut tally = Tally::default();
		tally.count_pixels(pixels);
		tally.finish()
	}

	/// Count the pixels of each distinct color in parallel.
	///
	/// The result is identical to [`ColorCollection::from_pixels`].
	#[cfg(feature = "threads")]
	#[must_use]
	pub fn from_pixels_par(pixels: &[Srgb<u8>]) -> Self {
		use rayon::prelude::*;

		let chunks = pixels
			.par_chunks(CHUNK_SIZE)
			.map(|chunk| {
				let mut tally = Tally::default();
				tally.count_pixels(chunk);
				tally.colors
			})
			.collect::<Vec<_>>();

		// Merging the chunks in order keeps the global first seen order
		let mut tally = Tally::default();
		for color in chunks.into_iter().flatten() {
			tally.count(color).expect("pixel counts are at most usize::MAX");
		}
		tally.finish()
	}

	/// Append `color`.
	///
	/// # Errors
	/// Returns [`Error::DuplicateColor`] if a color with the same footprint is already present.
	/// The collection is left unchanged in that case.
	pub fn add(&mut self, color: Color) -> Result<&mut Self> {
		let footprint = color.footprint();
		if !self.footprints.insert(footprint) {
			return Err(Error::DuplicateColor { footprint });
		}

		self.colors.push(color);
		Ok(self)
	}

	/// Remove every color whose footprint appears in `other`.
	///
	/// Colors of `other` that are not present are ignored.
	pub fn remove_colors(&mut self, other: &Self) -> &mut Self {
		let footprints = &mut self.footprints;
		self.colors.retain(|color| {
			let footprint = color.footprint();
			if other.contains(footprint) {
				footprints.remove(&footprint);
				false
			} else {
				true
			}
		});
		self
	}

	/// Sort by descending weight.
	///
	/// The sort is stable, so colors with equal weights keep their relative order.
	pub fn sort_by_weight_desc(&mut self) -> &mut Self {
		self.colors.sort_by_key(|color| std::cmp::Reverse(color.weight()));
		self
	}

	/// Keep only the first `max_count` colors
	pub fn limit(&mut self, max_count: usize) -> &mut Self {
		if max_count < self.colors.len() {
			for color in self.colors.drain(max_count..) {
				self.footprints.remove(&color.footprint());
			}
		}
		self
	}

	/// Keep only the first `max_count` colors, validating a signed count.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if `max_count` is negative.
	pub fn limit_checked(&mut self, max_count: i64) -> Result<&mut Self> {
		let max_count = usize::try_from(max_count).map_err(|_| Error::validation("max_count", max_count))?;
		Ok(self.limit(max_count))
	}

	/// Merge colors that are similar according to the normalized [`RgbDistance`].
	///
	/// See [`ColorCollection::combine_similar_by`].
	///
	/// # Errors
	/// Returns [`Error::Validation`] if `threshold` is not in `0.0..=1.0`.
	pub fn combine_similar(&mut self, merge_weights: bool, threshold: f64) -> Result<&mut Self> {
		self.combine_similar_by::<RgbDistance>(merge_weights, threshold)
	}

	/// Merge similar colors with a greedy, single pass over the current order.
	///
	/// Each color is compared to every color kept so far.
	/// If its difference to one of them is below `threshold`, it is discarded,
	/// and its weight is added to the first such kept color if `merge_weights` is `true`.
	/// Otherwise, the color is kept. The kept colors stay in order.
	///
	/// Each color is mapped to a [`ColorDifference::Point`] once,
	/// so expensive conversions (such as to Lab) are not repeated for every comparison.
	///
	/// The result depends on the input order: callers typically sort by descending weight first,
	/// so that the heaviest colors anchor each group. Earlier decisions are never revisited.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if `threshold` is not in `0.0..=1.0`,
	/// or if a merged weight overflows a `u64`. The collection is left unchanged in both cases.
	pub fn combine_similar_by<D: ColorDifference>(&mut self, merge_weights: bool, threshold: f64) -> Result<&mut Self> {
		if !(0.0..=1.0).contains(&threshold) {
			return Err(Error::validation("threshold", threshold));
		}

		let before = self.colors.len();
		let mut kept = Vec::<(Color, D::Point)>::new();

		for &color in &self.colors {
			let point = D::point(&color);
			let similar = kept
				.iter_mut()
				.find(|(_, anchor_point)| D::distance(anchor_point, &point) < threshold);

			if let Some((anchor, _)) = similar {
				tracing::trace!(%color, into = %anchor, "merging similar color");
				if merge_weights {
					anchor.add_weight(color.weight())?;
				}
			} else {
				kept.push((color, point));
			}
		}

		self.colors = kept.into_iter().map(|(color, _)| color).collect();
		self.footprints = self.colors.iter().map(Color::footprint).collect();

		tracing::debug!(before, after = self.colors.len(), threshold, "combined similar colors");

		Ok(self)
	}

	/// The number of colors
	#[must_use]
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// Whether there are no colors
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Whether a color with the given footprint is present
	#[must_use]
	pub fn contains(&self, footprint: Footprint) -> bool {
		self.footprints.contains(&footprint)
	}

	/// The color with the given footprint, if present
	#[must_use]
	pub fn get(&self, footprint: Footprint) -> Option<&Color> {
		if self.contains(footprint) {
			self.colors.iter().find(|color| color.footprint() == footprint)
		} else {
			None
		}
	}

	/// Sum of all weights
	#[must_use]
	pub fn total_weight(&self) -> u128 {
		self.colors.iter().map(|color| u128::from(color.weight())).sum()
	}

	/// Iterate over the colors in order
	pub fn iter(&self) -> std::slice::Iter<'_, Color> {
		self.colors.iter()
	}

	/// The colors in order
	#[must_use]
	pub fn as_slice(&self) -> &[Color] {
		&self.colors
	}
}

impl<'a> IntoIterator for &'a ColorCollection {
	type Item = &'a Color;
	type IntoIter = std::slice::Iter<'a, Color>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl IntoIterator for ColorCollection {
	type Item = Color;
	type IntoIter = std::vec::IntoIter<Color>;

	fn into_iter(self) -> Self::IntoIter {
		self.colors.into_iter()
	}
}
