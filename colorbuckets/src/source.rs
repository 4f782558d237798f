//! Traits for the image side of the pipeline: reading pixel histograms and writing palettes back out

use crate::ColorCollection;
use image::RgbImage;
use palette::Srgb;

/// Anything that can produce a color histogram.
///
/// The histogram is returned as a [`ColorCollection`] whose weights are pixel counts
/// and whose colors are ordered by their first occurrence.
pub trait HistogramSource {
	/// Count the pixels of each distinct color
	fn histogram(&self) -> ColorCollection;
}

impl HistogramSource for [Srgb<u8>] {
	fn histogram(&self) -> ColorCollection {
		#[cfg(feature = "threads")]
		{
			ColorCollection::from_pixels_par(self)
		}

		#[cfg(not(feature = "threads"))]
		{
			ColorCollection::from_pixels(self)
		}
	}
}

impl HistogramSource for Vec<Srgb<u8>> {
	fn histogram(&self) -> ColorCollection {
		self.as_slice().histogram()
	}
}

impl HistogramSource for RgbImage {
	fn histogram(&self) -> ColorCollection {
		let pixels: &[Srgb<u8>] = palette::cast::from_component_slice(self.as_raw());
		tracing::debug!(width = self.width(), height = self.height(), "counting image colors");
		pixels.histogram()
	}
}

/// Anything that can render a palette, e.g., into an image file of swatch strips
pub trait RasterWriter {
	/// The error produced when writing fails
	type Error;

	/// Write `colors`, in order, under the given name
	///
	/// # Errors
	/// Implementation defined. Writers should reject palettes they cannot render, such as empty ones.
	fn write_palette(&mut self, name: &str, colors: &ColorCollection) -> Result<(), Self::Error>;
}
