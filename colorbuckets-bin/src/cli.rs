//! Specifies the CLI and handles arg parsing

use clap::{ArgAction, Parser, ValueEnum};
use std::{
	fmt::{Debug, Display},
	num::ParseFloatError,
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};

/// Supported output formats for the final colors
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Extract the main colors of images by greedily combining similar colors,
/// and optionally map them onto the nearest ColorBrewer swatches using CIEDE2000.
///
/// Each image is first scaled down, then the colors of its top left and top center pixels
/// are treated as background and ignored.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(version)]
pub struct Options {
	/// The paths to the input images
	#[arg(required = true)]
	pub images: Vec<PathBuf>,

	/// Keep the colors of the top left and top center pixels instead of removing them as background
	#[arg(long = "no-background", action = ArgAction::SetFalse)]
	pub background: bool,

	/// Colors closer than this normalized RGB distance to a more common color are combined with it
	///
	/// The distance is the euclidean distance between the sRGB colors divided by its maximum,
	/// so the threshold should be in the range [0.0, 1.0].
	#[arg(short, long, default_value_t = 0.15, value_parser = parse_valid_threshold)]
	pub threshold: f64,

	/// Discard the pixel counts of combined colors instead of adding them to the color that absorbed them
	#[arg(long)]
	pub no_merge_weights: bool,

	/// The maximum number of colors to print for each image
	#[arg(short = 'n', long, default_value_t = 3)]
	pub count: usize,

	/// Also print each color mapped onto its nearest swatch
	#[arg(short = 'N', long)]
	pub normalize: bool,

	/// A YAML file with the swatches to map colors onto, instead of the ColorBrewer sequential schemes
	///
	/// The file should contain a list of families, each with a name and its shades as quoted hex colors:
	/// `families: [{ name: reds, shades: ["FFF3ED", "FEDBCC"] }]`
	#[arg(long, requires = "normalize")]
	pub catalog: Option<PathBuf>,

	/// Images larger than this in either dimension are scaled down to fit in a square of this size
	///
	/// This greatly reduces the number of distinct colors,
	/// at the cost of interpolating neighboring pixels together.
	#[arg(short = 's', long, default_value_t = 250, value_parser = clap::value_parser!(u32).range(1..))]
	pub max_size: u32,

	/// The format to print the colors in
	#[arg(short, long, default_value = "hex")]
	pub output: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// Write the palette of each image as a png of horizontal color strips into this directory
	#[arg(short, long)]
	pub write_strips: Option<PathBuf>,

	/// The number of threads to use
	///
	/// A value of 0 uses as many threads as there are CPUs.
	#[cfg(feature = "threads")]
	#[arg(short = 'j', long, default_value_t = 0)]
	pub threads: u8,

	/// Print additional information, such as the time taken for each step
	#[arg(long)]
	pub verbose: bool,
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse the merge threshold and ensure it is in `0.0..=1.0`
fn parse_valid_threshold(s: &str) -> Result<f64, String> {
	parse_float_in_range(s, 0.0..=1.0)
}
