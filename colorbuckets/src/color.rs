//! The color value model: an RGB triple together with a weight

use crate::{Error, Result};
use palette::Srgb;
use std::{fmt, str::FromStr};

/// Identity of a color irrespective of its weight.
///
/// This is the three channels packed as `0xRRGGBB`.
/// It displays as `red::green::blue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Footprint(u32);

impl Footprint {
	/// Pack the given channels into a footprint
	#[allow(clippy::cast_lossless)] // u32::from is not const
	#[must_use]
	pub const fn from_channels(red: u8, green: u8, blue: u8) -> Self {
		Self((red as u32) << 16 | (green as u32) << 8 | blue as u32)
	}

	/// The packed `0xRRGGBB` value
	#[must_use]
	pub const fn to_u32(self) -> u32 {
		self.0
	}

	/// The `[red, green, blue]` channels
	#[must_use]
	pub const fn channels(self) -> [u8; 3] {
		let [_, red, green, blue] = self.0.to_be_bytes();
		[red, green, blue]
	}
}

impl fmt::Display for Footprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let [red, green, blue] = self.channels();
		write!(f, "{red}::{green}::{blue}")
	}
}

/// A single sRGB color along with its weight in some context,
/// usually the number of pixels of that color in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
	/// Red channel
	red: u8,
	/// Green channel
	green: u8,
	/// Blue channel
	blue: u8,
	/// Non-negative weight
	weight: u64,
}

/// Check that `value` is a valid channel value
fn channel(field: &'static str, value: i64) -> Result<u8> {
	u8::try_from(value).map_err(|_| Error::validation(field, value))
}

/// Check that `value` is a valid weight
fn weight(value: i64) -> Result<u64> {
	u64::try_from(value).map_err(|_| Error::validation("weight", value))
}

impl Color {
	/// Create a color with a weight of `0`
	#[must_use]
	pub const fn new(red: u8, green: u8, blue: u8) -> Self {
		Self { red, green, blue, weight: 0 }
	}

	/// Returns this color with the weight replaced
	#[must_use]
	pub const fn with_weight(self, weight: u64) -> Self {
		Self { weight, ..self }
	}

	/// Create a color from unchecked integer components.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if a channel is outside `0..=255` or if the weight is negative.
	pub fn from_components(red: i64, green: i64, blue: i64, weight_value: i64) -> Result<Self> {
		Ok(Self {
			red: channel("red", red)?,
			green: channel("green", green)?,
			blue: channel("blue", blue)?,
			weight: weight(weight_value)?,
		})
	}

	/// Parse a color from six hex digits, optionally prefixed with `#`.
	///
	/// Both upper and lower case digits are accepted. The weight is `0`.
	///
	/// # Errors
	/// Returns [`Error::InvalidHex`] if the string is not exactly six hex digits.
	pub fn from_hex(hex: &str) -> Result<Self> {
		let invalid = |reason| Error::InvalidHex { input: hex.to_owned(), reason };

		let digits = hex.strip_prefix('#').unwrap_or(hex);
		if digits.len() != 6 {
			return Err(invalid("expected 6 hex digits"));
		}
		if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return Err(invalid("contains a non-hex digit"));
		}

		let packed = u32::from_str_radix(digits, 16).map_err(|_| invalid("contains a non-hex digit"))?;
		let [red, green, blue] = Footprint(packed).channels();
		Ok(Self::new(red, green, blue))
	}

	/// Red channel
	#[must_use]
	pub const fn red(&self) -> u8 {
		self.red
	}

	/// Green channel
	#[must_use]
	pub const fn green(&self) -> u8 {
		self.green
	}

	/// Blue channel
	#[must_use]
	pub const fn blue(&self) -> u8 {
		self.blue
	}

	/// The weight of this color
	#[must_use]
	pub const fn weight(&self) -> u64 {
		self.weight
	}

	/// Set the red channel.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if `red` is outside `0..=255`, leaving the color unchanged.
	pub fn set_red(&mut self, red: i64) -> Result<&mut Self> {
		self.red = channel("red", red)?;
		Ok(self)
	}

	/// Set the green channel.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if `green` is outside `0..=255`, leaving the color unchanged.
	pub fn set_green(&mut self, green: i64) -> Result<&mut Self> {
		self.green = channel("green", green)?;
		Ok(self)
	}

	/// Set the blue channel.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if `blue` is outside `0..=255`, leaving the color unchanged.
	pub fn set_blue(&mut self, blue: i64) -> Result<&mut Self> {
		self.blue = channel("blue", blue)?;
		Ok(self)
	}

	/// Set the weight.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if `weight` is negative, leaving the color unchanged.
	pub fn set_weight(&mut self, weight_value: i64) -> Result<&mut Self> {
		self.weight = weight(weight_value)?;
		Ok(self)
	}

	/// Increase the weight by `amount`.
	///
	/// # Errors
	/// Returns [`Error::Validation`] if the sum does not fit in a `u64`, leaving the color unchanged.
	pub fn add_weight(&mut self, amount: u64) -> Result<&mut Self> {
		self.weight = self
			.weight
			.checked_add(amount)
			.ok_or_else(|| Error::validation("weight", format!("{} + {amount}", self.weight)))?;
		Ok(self)
	}

	/// The identity of this color, ignoring its weight
	#[must_use]
	pub const fn footprint(&self) -> Footprint {
		Footprint::from_channels(self.red, self.green, self.blue)
	}

	/// Six lowercase, zero padded hex digits (without a `#`)
	#[must_use]
	pub fn hex(&self) -> String {
		format!("{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
	}

	/// The color packed as a 24-bit `0xRRGGBB` integer
	#[must_use]
	pub const fn to_u32(&self) -> u32 {
		self.footprint().to_u32()
	}

	/// The channels as an [`Srgb`] color
	#[must_use]
	pub const fn to_srgb(&self) -> Srgb<u8> {
		Srgb::new(self.red, self.green, self.blue)
	}
}

impl From<Srgb<u8>> for Color {
	fn from(srgb: Srgb<u8>) -> Self {
		Self::new(srgb.red, srgb.green, srgb.blue)
	}
}

impl From<Color> for Srgb<u8> {
	fn from(color: Color) -> Self {
		color.to_srgb()
	}
}

impl FromStr for Color {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Self::from_hex(s)
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rgb({},{},{})", self.red, self.green, self.blue)
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use rand::{Rng, SeedableRng};
	use rand_xoshiro::Xoroshiro128PlusPlus;

	#[test]
	fn footprint_ignores_weight() {
		let light = Color::new(10, 20, 30).with_weight(1);
		let heavy = Color::new(10, 20, 30).with_weight(500);

		assert_ne!(light, heavy);
		assert_eq!(light.footprint(), heavy.footprint());
		assert_eq!(light.footprint().to_string(), "10::20::30");
	}

	#[test]
	fn hex_is_zero_padded() {
		let color = Color::new(0x0a, 0x00, 0xff);
		assert_eq!(color.hex(), "0a00ff");
		assert_eq!(color.to_u32(), 0x0a00ff);
	}

	#[test]
	fn hex_round_trips_random_colors() {
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
		for _ in 0..1000 {
			let color = Color::new(rng.gen(), rng.gen(), rng.gen()).with_weight(rng.gen());
			let parsed = Color::from_hex(&color.hex()).unwrap();

			assert_eq!(parsed.footprint(), color.footprint());
			assert_eq!(parsed.weight(), 0);
			assert_eq!(u32::from_str_radix(&color.hex(), 16).unwrap(), color.to_u32());
		}
	}

	#[test]
	fn from_hex_accepts_prefix_and_upper_case() {
		let color: Color = "#F6FBFC".parse().unwrap();
		assert_eq!(color, Color::new(0xf6, 0xfb, 0xfc));
		assert_eq!(Color::from_hex("f6fbfc").unwrap(), color);
	}

	#[test]
	fn from_hex_rejects_bad_input() {
		for input in ["", "#", "fff", "1234567", "12345g", "+12345", "#12 345"] {
			let err = Color::from_hex(input).unwrap_err();
			assert!(matches!(err, Error::InvalidHex { .. }), "{input}");
		}
	}

	#[test]
	fn from_components_validates_every_field() {
		assert_eq!(Color::from_components(255, 0, 128, 7).unwrap(), Color::new(255, 0, 128).with_weight(7));

		let cases = [
			((256, 0, 0, 0), "red"),
			((0, -1, 0, 0), "green"),
			((0, 0, 1000, 0), "blue"),
			((0, 0, 0, -1), "weight"),
		];

		for ((r, g, b, w), expected) in cases {
			match Color::from_components(r, g, b, w) {
				Err(Error::Validation { field, .. }) => assert_eq!(field, expected),
				other => panic!("expected a validation error for {expected}, got {other:?}"),
			}
		}
	}

	#[test]
	fn setters_revalidate() {
		let mut color = Color::new(1, 2, 3);

		color.set_red(200).unwrap().set_green(100).unwrap().set_blue(0).unwrap();
		assert_eq!(color.footprint(), Footprint::from_channels(200, 100, 0));

		assert!(color.set_red(-5).unwrap_err().is_validation());
		assert!(color.set_blue(300).unwrap_err().is_validation());
		assert!(color.set_weight(-1).unwrap_err().is_validation());
		assert_eq!(color, Color::new(200, 100, 0));
	}

	#[test]
	fn add_weight_goes_past_u32_and_rejects_overflow() {
		let mut color = Color::new(0, 0, 0).with_weight(u64::from(u32::MAX));
		color.add_weight(u64::from(u32::MAX)).unwrap();
		assert_eq!(color.weight(), 2 * u64::from(u32::MAX));

		let mut color = Color::new(0, 0, 0).with_weight(u64::MAX - 1);
		color.add_weight(1).unwrap();
		assert_eq!(color.weight(), u64::MAX);

		assert!(color.add_weight(1).unwrap_err().is_validation());
		assert_eq!(color.weight(), u64::MAX);
	}

	#[test]
	fn accepts_weights_beyond_u32() {
		let color = Color::from_components(1, 2, 3, 5_000_000_000).unwrap();
		assert_eq!(color.weight(), 5_000_000_000);

		let mut color = Color::new(1, 2, 3);
		color.set_weight(i64::MAX).unwrap();
		assert_eq!(color.weight(), i64::MAX.unsigned_abs());
	}

	#[test]
	fn displays_as_rgb_function() {
		assert_eq!(Color::new(1, 22, 255).to_string(), "rgb(1,22,255)");
	}

	#[test]
	fn srgb_conversion_round_trips() {
		let srgb = Srgb::new(12u8, 34, 56);
		assert_eq!(Srgb::from(Color::from(srgb)), srgb);
	}
}
