//! Error type shared by every fallible operation in the crate

use crate::color::Footprint;
use thiserror::Error;

/// Result type alias for `colorbuckets` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building or reducing palettes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// A value was outside of the range accepted for the named field
	#[error("invalid value for {field}: {value}")]
	Validation {
		/// The parameter or field that was rejected
		field: &'static str,
		/// The rejected value, formatted for display
		value: String,
	},

	/// A color with the same footprint is already present in the collection
	#[error("color {footprint} already exists in this collection")]
	DuplicateColor {
		/// Footprint of the rejected color
		footprint: Footprint,
	},

	/// A string could not be parsed as a six digit hex color
	#[error("invalid hex color {input:?}: {reason}")]
	InvalidHex {
		/// The string that failed to parse
		input: String,
		/// Why the string was rejected
		reason: &'static str,
	},

	/// A swatch catalog could not be loaded
	#[error("invalid swatch catalog: {0}")]
	Catalog(String),
}

impl Error {
	/// Create a validation error for `field` holding `value`
	pub(crate) fn validation(field: &'static str, value: impl ToString) -> Self {
		Self::Validation { field, value: value.to_string() }
	}

	/// Whether this is a [`Error::Validation`]
	#[must_use]
	pub const fn is_validation(&self) -> bool {
		matches!(self, Self::Validation { .. })
	}

	/// Whether this is a [`Error::DuplicateColor`]
	#[must_use]
	pub const fn is_duplicate(&self) -> bool {
		matches!(self, Self::DuplicateColor { .. })
	}
}

impl From<serde_yaml::Error> for Error {
	fn from(e: serde_yaml::Error) -> Self {
		Self::Catalog(e.to_string())
	}
}
