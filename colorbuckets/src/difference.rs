//! Perceptual color difference: sRGB to CIE L\*a\*b\* conversion and the CIEDE2000 metric
//!
//! Also provides the normalized color difference measures
//! used to decide whether two palette colors are similar.

use crate::Color;
use palette::{white_point::D65, FromColor, Lab, Srgb};

/// `25^7`, shared by the chroma correction and the rotation term
const POW25_7: f64 = 6_103_515_625.0;

/// Convert an 8-bit sRGB color to CIE L\*a\*b\* under the D65 reference white.
///
/// The channels are normalized to `0.0..=1.0` and linearized with the inverse sRGB transfer function,
/// then converted to XYZ and finally to Lab (`ε = 216/24389`, `κ = 24389/27`).
#[must_use]
pub fn srgb_to_lab(srgb: Srgb<u8>) -> Lab<D65, f64> {
	Lab::from_color(srgb.into_format::<f64>().into_linear())
}

/// Hue angle of `(a, b)` in degrees, in `0.0..360.0`.
/// The hue of a neutral color is undefined and reported as `0.0`.
#[allow(clippy::float_cmp)]
fn hue_degrees(a: f64, b: f64) -> f64 {
	if a == 0.0 && b == 0.0 {
		0.0
	} else {
		let hue = b.atan2(a).to_degrees();
		if hue < 0.0 {
			hue + 360.0
		} else {
			hue
		}
	}
}

/// The CIEDE2000 color difference (ΔE₀₀) between two Lab colors.
///
/// Uses unit parametric factors (`k_L = k_C = k_H = 1`).
/// The result is symmetric and is `0.0` for identical colors.
/// When either color has zero chroma after the `a′` correction,
/// its hue is undefined: the hue difference is taken as `0.0`
/// and the mean hue is the sum of both hues.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn ciede2000(x: Lab<D65, f64>, y: Lab<D65, f64>) -> f64 {
	let (l1, a1, b1) = (x.l, x.a, x.b);
	let (l2, a2, b2) = (y.l, y.a, y.b);

	// a′ correction towards a more uniform hue circle for low chroma colors
	let c_mean = (a1.hypot(b1) + a2.hypot(b2)) / 2.0;
	let c_mean7 = c_mean.powi(7);
	let g = 0.5 * (1.0 - (c_mean7 / (c_mean7 + POW25_7)).sqrt());

	let a1p = a1 * (1.0 + g);
	let a2p = a2 * (1.0 + g);
	let c1p = a1p.hypot(b1);
	let c2p = a2p.hypot(b2);
	let h1p = hue_degrees(a1p, b1);
	let h2p = hue_degrees(a2p, b2);

	let chroma_product = c1p * c2p;
	#[allow(clippy::float_cmp)]
	let neutral = chroma_product == 0.0;

	// Differences
	let dl = l2 - l1;
	let dc = c2p - c1p;
	let dh = if neutral {
		0.0
	} else {
		let dh = h2p - h1p;
		if dh > 180.0 {
			dh - 360.0
		} else if dh < -180.0 {
			dh + 360.0
		} else {
			dh
		}
	};
	let dh = 2.0 * chroma_product.sqrt() * (dh.to_radians() / 2.0).sin();

	// Means
	let l_mean = (l1 + l2) / 2.0;
	let cp_mean = (c1p + c2p) / 2.0;
	let h_sum = h1p + h2p;
	let h_mean = if neutral {
		h_sum
	} else if (h1p - h2p).abs() <= 180.0 {
		h_sum / 2.0
	} else if h_sum < 360.0 {
		(h_sum + 360.0) / 2.0
	} else {
		(h_sum - 360.0) / 2.0
	};

	// Weighting functions
	let t = 1.0 - 0.17 * (h_mean - 30.0).to_radians().cos()
		+ 0.24 * (2.0 * h_mean).to_radians().cos()
		+ 0.32 * (3.0 * h_mean + 6.0).to_radians().cos()
		- 0.20 * (4.0 * h_mean - 63.0).to_radians().cos();

	let l_offset = (l_mean - 50.0).powi(2);
	let sl = 1.0 + 0.015 * l_offset / (20.0 + l_offset).sqrt();
	let sc = 1.0 + 0.045 * cp_mean;
	let sh = 1.0 + 0.015 * cp_mean * t;

	// Rotation term for the blue region
	let delta_theta = 30.0 * (-((h_mean - 275.0) / 25.0).powi(2)).exp();
	let cp_mean7 = cp_mean.powi(7);
	let rc = 2.0 * (cp_mean7 / (cp_mean7 + POW25_7)).sqrt();
	let rt = -(2.0 * delta_theta).to_radians().sin() * rc;

	let l = dl / sl;
	let c = dc / sc;
	let h = dh / sh;

	(l * l + c * c + h * h + rt * c * h).sqrt()
}

/// The CIEDE2000 difference between two palette colors
#[must_use]
pub fn delta_e(x: &Color, y: &Color) -> f64 {
	ciede2000(srgb_to_lab(x.to_srgb()), srgb_to_lab(y.to_srgb()))
}

/// Normalized color difference used to decide whether two colors are similar.
///
/// Colors are first mapped to a [`ColorDifference::Point`],
/// so that callers comparing one color against many can convert it only once.
pub trait ColorDifference {
	/// The representation that distances are computed on
	type Point;

	/// Convert a color into a point
	fn point(color: &Color) -> Self::Point;

	/// Symmetric distance in `0.0..=1.0` between two points, where `0.0` means identical
	fn distance(x: &Self::Point, y: &Self::Point) -> f64;

	/// The distance between two colors
	fn difference(x: &Color, y: &Color) -> f64 {
		Self::distance(&Self::point(x), &Self::point(y))
	}
}

/// Euclidean distance in device RGB space, divided by the distance between black and white
pub struct RgbDistance;

impl ColorDifference for RgbDistance {
	type Point = [f64; 3];

	fn point(color: &Color) -> Self::Point {
		[color.red(), color.green(), color.blue()].map(f64::from)
	}

	fn distance(x: &Self::Point, y: &Self::Point) -> f64 {
		let sum = x.iter().zip(y).map(|(x, y)| (x - y) * (x - y)).sum::<f64>();
		(sum / (3.0 * 255.0 * 255.0)).sqrt()
	}
}

/// CIEDE2000 divided by `100`, capped at `1.0`.
///
/// Points are Lab colors, so each color is converted from sRGB only once per merge.
pub struct DeltaE2000;

impl ColorDifference for DeltaE2000 {
	type Point = Lab<D65, f64>;

	fn point(color: &Color) -> Self::Point {
		srgb_to_lab(color.to_srgb())
	}

	fn distance(x: &Self::Point, y: &Self::Point) -> f64 {
		f64::min(ciede2000(*x, *y) / 100.0, 1.0)
	}
}
