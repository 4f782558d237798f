//! Reference swatch catalogs and mapping colors onto their nearest swatch

use crate::{
	difference::{ciede2000, srgb_to_lab},
	Color, ColorCollection, Error, Footprint, Result,
};
use lazy_static::lazy_static;
use palette::{white_point::D65, Lab};
use serde::Deserialize;

/// The ColorBrewer sequential schemes, 8 shades each, from lightest to darkest
#[rustfmt::skip]
const COLORBREWER_SEQUENTIAL: [(&str, [&str; 8]); 16] = [
	("bugn", ["F6FBFC", "E1F4F8", "C5E9E2", "8ED3C2", "5BBB9A", "39A46B", "20803C", "014E20"]),
	("gnbu", ["F6FCED", "DBF1D6", "C5E8BE", "9ED8AC", "70C5BC", "45AACD", "2681B6", "064E93"]),
	("greens", ["F6FCF3", "E1F4DC", "C0E6B8", "97D390", "69BC6B", "39A153", "20803C", "014F2C"]),
	("ylgn", ["FFFEE1", "F5FCB0", "D4ED99", "A4D883", "6DBE6E", "39A153", "20793A", "014F2C"]),
	("ylgnbu", ["FFFED3", "EAF7A8", "C0E5AB", "74C6B3", "39ADBC", "1A86B8", "1F549E", "0E2779"]),
	("bupu", ["F6FBFC", "DCE9F2", "B7CDE2", "93B3D5", "808BBE", "8060A7", "7C3992", "621560"]),
	("pubu", ["FFF6FA", "E9E4F0", "C9CBE2", "9CB4D5", "689FC8", "2F85B8", "0565A6", "04456F"]),
	("pubugn", ["FFF6FA", "E9DEEE", "C9CBE2", "9CB4D5", "689FC8", "2F85B8", "00767F", "015947"]),
	("purples", ["FBFAFC", "EDEAF3", "D4D5E8", "B4B5D7", "938FC1", "7472B2", "5F4799", "40177B"]),
	("purd", ["F6F2F8", "E4DDED", "CEB1D4", "C289C0", "DB5AA6", "E3267E", "C71E4B", "861437"]),
	("rdpu", ["FFF6F1", "FDDCD8", "FCBDB8", "F995AC", "F65D97", "D82E8C", "A51E73", "6E186C"]),
	("reds", ["FFF3ED", "FEDBCC", "FCB297", "FC8766", "FA5F41", "ED3327", "C41A1B", "8E1310"]),
	("oranges", ["FFF4E8", "FEE2C7", "FCCA98", "FDA560", "FD8135", "EF5E14", "D43F01", "812805"]),
	("orred", ["FFF6E9", "FEE5C1", "FCCE94", "FDB378", "FC824F", "EC5940", "D12A1D", "8E1300"]),
	("ylorbr", ["FFFEE1", "FFF6B3", "FEDF86", "FEBC46", "FE8E24", "E96514", "C54202", "812805"]),
	("greys", ["FFFFFF", "F3F3F3", "ECECEC", "D0D0D0", "848484", "5F5F5F", "414141", "000000"]),
];

lazy_static! {
	/// The built-in catalog, parsed once
	static ref DEFAULT_CATALOG: SwatchCatalog = SwatchCatalog::from_families(
		COLORBREWER_SEQUENTIAL.iter().map(|(name, shades)| (*name, shades.as_slice()))
	)
	.expect("built-in catalog holds valid hex colors");
}

/// Identifies a swatch by its family and its shade within that family.
///
/// Both start at `1`, and shades go from lightest to darkest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwatchId {
	/// Family (hue group) of the swatch
	pub family: u8,
	/// Position of the swatch in its family
	pub shade: u8,
}

impl SwatchId {
	/// The family and shade written one after the other as a decimal number,
	/// e.g., family `1` and shade `2` give `12`.
	///
	/// This is only suitable as a grouping or ranking hint.
	/// It is ambiguous for multi-digit ids: `(1, 12)` and `(11, 2)` both give `112`.
	#[must_use]
	pub fn legacy_ordinal(self) -> u32 {
		let shade = u32::from(self.shade);
		let mut scale = 10;
		while scale <= shade {
			scale *= 10;
		}
		u32::from(self.family) * scale + shade
	}
}

/// A canonical reference color
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
	/// Family and shade
	id: SwatchId,
	/// Name of the family
	family_name: String,
	/// The swatch color, with a weight of `0`
	color: Color,
	/// Cached Lab value of `color`
	lab: Lab<D65, f64>,
}

impl Swatch {
	/// Family and shade of this swatch
	#[must_use]
	pub const fn id(&self) -> SwatchId {
		self.id
	}

	/// Name of the family, e.g., `"bugn"`
	#[must_use]
	pub fn family_name(&self) -> &str {
		&self.family_name
	}

	/// The swatch color
	#[must_use]
	pub const fn color(&self) -> Color {
		self.color
	}
}

/// Layout of a catalog configuration file
#[derive(Debug, Deserialize)]
struct CatalogConfig {
	/// Families in catalog order
	families: Vec<FamilyConfig>,
}

/// One family of a catalog configuration file
#[derive(Debug, Deserialize)]
struct FamilyConfig {
	/// Family name
	name: String,
	/// Hex colors from lightest to darkest
	shades: Vec<String>,
}

/// An ordered, non-empty, immutable table of reference swatches
#[derive(Debug, Clone, PartialEq)]
pub struct SwatchCatalog {
	/// Swatches in catalog order
	swatches: Vec<Swatch>,
}

impl SwatchCatalog {
	/// The built-in catalog: the 16 ColorBrewer sequential schemes with 8 shades each.
	///
	/// It is built on first use and shared for the lifetime of the process.
	#[must_use]
	pub fn default_catalog() -> &'static Self {
		&DEFAULT_CATALOG
	}

	/// Build a catalog from named families of hex colors.
	///
	/// Families are numbered from `1` in the given order,
	/// and so are the shades within each family.
	///
	/// # Errors
	/// Returns [`Error::Catalog`] for an invalid hex color, if there are no swatches,
	/// or if there are more than 255 families or shades in a family.
	pub fn from_families<'a, Name, Shades, Hex>(families: impl IntoIterator<Item = (Name, Shades)>) -> Result<Self>
	where
		Name: Into<String>,
		Shades: IntoIterator<Item = &'a Hex>,
		Hex: AsRef<str> + ?Sized + 'a,
	{
		let mut swatches = Vec::new();

		for (family, (name, shades)) in (1..).zip(families) {
			let family = u8::try_from(family).map_err(|_| Error::Catalog("more than 255 families".to_owned()))?;
			let name = name.into();

			for (shade, hex) in (1..).zip(shades) {
				let shade = u8::try_from(shade)
					.map_err(|_| Error::Catalog(format!("family {name} has more than 255 shades")))?;
				let color = Color::from_hex(hex.as_ref()).map_err(|e| Error::Catalog(format!("family {name}: {e}")))?;

				swatches.push(Swatch {
					id: SwatchId { family, shade },
					family_name: name.clone(),
					color,
					lab: srgb_to_lab(color.to_srgb()),
				});
			}
		}

		if swatches.is_empty() {
			return Err(Error::Catalog("catalog holds no swatches".to_owned()));
		}

		Ok(Self { swatches })
	}

	/// Load a catalog from YAML text of the form
	///
	/// ```yaml
	/// families:
	///   - name: reds
	///     shades: ["FFF3ED", "FEDBCC", "FCB297"]
	///   - name: greys
	///     shades: ["FFFFFF", "848484", "000000"]
	/// ```
	///
	/// Hex values should be quoted, since YAML reads some of them as numbers otherwise.
	///
	/// # Errors
	/// Returns [`Error::Catalog`] if the text is not a valid catalog,
	/// or any error of [`SwatchCatalog::from_families`].
	pub fn from_yaml_str(yaml: &str) -> Result<Self> {
		let config: CatalogConfig = serde_yaml::from_str(yaml)?;
		let catalog = Self::from_families(config.families.iter().map(|family| (family.name.as_str(), &family.shades)))?;

		tracing::debug!(swatches = catalog.len(), "loaded swatch catalog");

		Ok(catalog)
	}

	/// The number of swatches
	#[must_use]
	pub fn len(&self) -> usize {
		self.swatches.len()
	}

	/// Always `false`, since catalogs cannot be empty
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.swatches.is_empty()
	}

	/// Iterate over the swatches in catalog order
	pub fn iter(&self) -> std::slice::Iter<'_, Swatch> {
		self.swatches.iter()
	}

	/// The first swatch with the given id
	#[must_use]
	pub fn get(&self, id: SwatchId) -> Option<&Swatch> {
		self.swatches.iter().find(|swatch| swatch.id == id)
	}

	/// The first swatch, in catalog order, with the given footprint
	#[must_use]
	pub fn find(&self, footprint: Footprint) -> Option<&Swatch> {
		self.swatches.iter().find(|swatch| swatch.color.footprint() == footprint)
	}
}

/// A color mapped onto the nearest swatch of a catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedColor {
	/// The swatch color.
	/// Its weight is either `0` or the swatch's [`SwatchId::legacy_ordinal`].
	pub color: Color,
	/// The swatch that was chosen
	pub swatch: SwatchId,
	/// CIEDE2000 difference between the input color and the swatch
	pub distance: f64,
}

/// Maps colors onto the perceptually nearest swatch of a catalog
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
	/// The reference swatches
	catalog: &'a SwatchCatalog,
}

impl Default for Normalizer<'static> {
	fn default() -> Self {
		Self::new(SwatchCatalog::default_catalog())
	}
}

impl<'a> Normalizer<'a> {
	/// Create a normalizer over the given catalog
	#[must_use]
	pub const fn new(catalog: &'a SwatchCatalog) -> Self {
		Self { catalog }
	}

	/// The catalog used by this normalizer
	#[must_use]
	pub const fn catalog(&self) -> &'a SwatchCatalog {
		self.catalog
	}

	/// The swatch with the smallest CIEDE2000 difference to `color`, and that difference.
	///
	/// Ties keep the swatch that comes first in the catalog.
	#[must_use]
	pub fn nearest(&self, color: &Color) -> (&'a Swatch, f64) {
		let lab = srgb_to_lab(color.to_srgb());

		let (first, rest) = self.catalog.swatches.split_first().expect("catalogs are never empty");
		let mut nearest = (first, ciede2000(lab, first.lab));

		for swatch in rest {
			let distance = ciede2000(lab, swatch.lab);
			if distance < nearest.1 {
				nearest = (swatch, distance);
			}
		}

		nearest
	}

	/// Map `color` onto its nearest swatch.
	///
	/// The returned color is a fresh copy of the swatch color.
	/// If `include_weight` is `true`, its weight is the swatch's [`SwatchId::legacy_ordinal`],
	/// otherwise it is `0`. The input weight is never carried over.
	#[must_use]
	pub fn map_color(&self, color: &Color, include_weight: bool) -> MappedColor {
		let (swatch, distance) = self.nearest(color);

		let mapped = if include_weight {
			swatch.color.with_weight(u64::from(swatch.id.legacy_ordinal()))
		} else {
			swatch.color
		};

		MappedColor { color: mapped, swatch: swatch.id, distance }
	}

	/// Map every color of `colors`, in order.
	///
	/// A mapped color whose footprint was already produced by an earlier color is skipped.
	#[must_use]
	pub fn normalize(&self, colors: &ColorCollection, include_weight: bool) -> ColorCollection {
		let mut normalized = ColorCollection::new();

		for color in colors {
			let mapped = self.map_color(color, include_weight);
			if let Err(e) = normalized.add(mapped.color) {
				tracing::debug!(%color, swatch = ?mapped.swatch, "skipping color: {e}");
			}
		}

		normalized
	}
}
