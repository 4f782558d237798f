//! Renders palettes as png images of horizontal color strips

use std::path::{Path, PathBuf};

use colorbuckets::{ColorCollection, RasterWriter};
use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;

/// Width of a strip image
pub const STRIP_WIDTH: u32 = 200;

/// Height of the band drawn for each color
pub const BAND_HEIGHT: u32 = 100;

/// Error cases for writing a strip image
#[derive(Debug, Error)]
pub enum StripError {
    /// There were no colors to draw
    #[error("cannot write {}: the palette has no colors", .0.display())]
    Empty(PathBuf),
    /// The palette does not fit into a single image
    #[error("cannot write {}: the palette has too many colors", .0.display())]
    TooManyColors(PathBuf),
    /// Failed to encode or save the image
    #[error("failed to write {}: {source}", .path.display())]
    Save {
        /// Destination of the image
        path: PathBuf,
        /// The underlying error
        source: image::ImageError,
    },
}

/// Writes each palette as `<dir>/<name>.png`
#[derive(Debug, Clone)]
pub struct StripWriter {
    /// Output directory
    dir: PathBuf,
}

impl StripWriter {
    /// Create a writer for the given, existing directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The file that a palette with the given name is written to
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.png"))
    }
}

/// Draw one `STRIP_WIDTH` wide band of `BAND_HEIGHT` pixels for each color, top to bottom
fn render(colors: &ColorCollection, path: &Path) -> Result<RgbImage, StripError> {
    let bands = colors.as_slice();
    if bands.is_empty() {
        return Err(StripError::Empty(path.to_owned()));
    }

    let height = u32::try_from(bands.len())
        .ok()
        .and_then(|len| len.checked_mul(BAND_HEIGHT))
        .ok_or_else(|| StripError::TooManyColors(path.to_owned()))?;

    Ok(RgbImage::from_fn(STRIP_WIDTH, height, |_, y| {
        let color = bands[(y / BAND_HEIGHT) as usize];
        Rgb([color.red(), color.green(), color.blue()])
    }))
}

impl RasterWriter for StripWriter {
    type Error = StripError;

    fn write_palette(&mut self, name: &str, colors: &ColorCollection) -> Result<(), Self::Error> {
        let path = self.path_for(name);
        let image = render(colors, &path)?;

        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| StripError::Save {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), colors = colors.len(), "wrote palette strip");

        Ok(())
    }
}
