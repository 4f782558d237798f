//! Extract the main colors of images and map them onto reference swatches.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::unreadable_literal
)]

mod cli;
mod strip;

#[allow(clippy::wildcard_imports)]
use cli::*;
use strip::{StripError, StripWriter};

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use colorbuckets::{
    Color, ColorCollection, HistogramSource, Normalizer, RasterWriter, ReduceOptions, SwatchCatalog,
};
use colored::Colorize;
use image::{DynamicImage, GenericImageView, RgbImage};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Record the running time of a function and log the elapsed time
macro_rules! time {
    ($name: literal, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        tracing::debug!("{} took {}ms", $name, start.elapsed().as_millis());
        result
    }};
}

/// Error cases for the command line tool
#[derive(Debug, Error)]
enum CliError {
    /// Failed to read or decode an image file
    #[error("Failed to load the image file {}: {source}", .path.display())]
    ImageLoad {
        /// The image file
        path: PathBuf,
        /// The underlying error
        source: image::ImageError,
    },
    /// Failed to read the catalog file
    #[error("Failed to read the catalog file {}: {source}", .path.display())]
    CatalogRead {
        /// The catalog file
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },
    /// The palette could not be computed or the catalog was invalid
    #[error(transparent)]
    Palette(#[from] colorbuckets::Error),
    /// Failed to write a strip image
    #[error(transparent)]
    Strip(#[from] StripError),
    /// Failed to create the thread pool
    #[cfg(feature = "threads")]
    #[error("Failed to create the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// The colors found for a single image
#[derive(Debug)]
struct ImagePalette {
    /// The image file
    path: PathBuf,
    /// The main colors, most common first
    colors: ColorCollection,
    /// The main colors mapped onto swatches, if requested
    normalized: Option<ColorCollection>,
}

fn main() -> ExitCode {
    let options = Options::parse();

    init_logging(options.verbose);

    let result = run_generate_and_print_palettes(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Log to stderr, filtered by `RUST_LOG` unless `verbose` is set
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("colorbuckets=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds a thread pool and then runs `generate_and_print_palettes`
#[cfg(feature = "threads")]
fn run_generate_and_print_palettes(options: &Options) -> Result<(), CliError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()?;

    pool.install(|| generate_and_print_palettes(options))
}

/// Runs `generate_and_print_palettes` on a single thread
#[cfg(not(feature = "threads"))]
fn run_generate_and_print_palettes(options: &Options) -> Result<(), CliError> {
    generate_and_print_palettes(options)
}

/// Load the catalog given in the options, or the built-in one
fn load_catalog(options: &Options) -> Result<Option<SwatchCatalog>, CliError> {
    options
        .catalog
        .as_ref()
        .map(|path| {
            let yaml = std::fs::read_to_string(path).map_err(|source| CliError::CatalogRead {
                path: path.clone(),
                source,
            })?;
            Ok(SwatchCatalog::from_yaml_str(&yaml)?)
        })
        .transpose()
}

/// Generate the palette of each image, then print them in the order given
fn generate_and_print_palettes(options: &Options) -> Result<(), CliError> {
    let custom_catalog = load_catalog(options)?;
    let catalog = custom_catalog
        .as_ref()
        .unwrap_or_else(|| SwatchCatalog::default_catalog());
    let normalizer = Normalizer::new(catalog);

    let generate = |path: &PathBuf| generate_palette(path, options, &normalizer);

    #[cfg(feature = "threads")]
    let palettes = {
        use rayon::prelude::*;
        options.images.par_iter().map(generate).collect::<Vec<_>>()
    };

    #[cfg(not(feature = "threads"))]
    let palettes = options.images.iter().map(generate).collect::<Vec<_>>();

    let show_path = options.images.len() > 1;
    for palette in palettes {
        print_palette(&palette?, options, show_path);
    }

    Ok(())
}

/// Load an image, find its palette, and write the strip images if requested
fn generate_palette(
    path: &Path,
    options: &Options,
    normalizer: &Normalizer,
) -> Result<ImagePalette, CliError> {
    let image = time!("Image loading", load_image(path))?;
    let image = generate_thumbnail(image, options.max_size).into_rgb8();

    let (colors, normalized) = time!(
        "Palette generation",
        palette_of(&image, options, normalizer)
    )?;

    if colors.is_empty() {
        tracing::warn!(
            "No colors remain for {} after removing the background",
            path.display()
        );
    } else if let Some(dir) = &options.write_strips {
        let stem = path
            .file_stem()
            .map_or_else(|| "image".into(), |stem| stem.to_string_lossy());

        let mut writer = StripWriter::new(dir);
        writer.write_palette(&format!("{stem}_palette"), &colors)?;
        if let Some(normalized) = &normalized {
            writer.write_palette(&format!("{stem}_normalized"), normalized)?;
        }
    }

    Ok(ImagePalette {
        path: path.to_owned(),
        colors,
        normalized,
    })
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, CliError> {
    image::open(path).map_err(|source| CliError::ImageLoad {
        path: path.to_owned(),
        source,
    })
}

/// Scale the image down to fit in a `max_size` by `max_size` square if it is larger than that
fn generate_thumbnail(image: DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_size && height <= max_size {
        tracing::debug!("Skipping image thumbnail since the image is within the max size");
        image
    } else {
        tracing::debug!("Creating a thumbnail of the {width}x{height} image");
        time!("Image thumbnail", image.thumbnail(max_size, max_size))
    }
}

/// The colors of the top left and top center pixels, which are assumed to be background
fn sample_background(image: &RgbImage) -> ColorCollection {
    let (width, height) = image.dimensions();
    let mut background = ColorCollection::new();
    if width == 0 || height == 0 {
        return background;
    }

    for x in [0, width / 2] {
        let [red, green, blue] = image.get_pixel(x, 0).0;
        // Both pixels may have the same color
        let _ = background.add(Color::new(red, green, blue));
    }

    background
}

/// Reduce the colors of the image and map them onto swatches, as given by the options
fn palette_of(
    image: &RgbImage,
    options: &Options,
    normalizer: &Normalizer,
) -> Result<(ColorCollection, Option<ColorCollection>), CliError> {
    let histogram = time!("Color counting", image.histogram());

    let background = if options.background {
        sample_background(image)
    } else {
        ColorCollection::new()
    };

    let reduce_options = ReduceOptions {
        threshold: options.threshold,
        merge_weights: !options.no_merge_weights,
        max_colors: options.count,
    };

    let colors = colorbuckets::reduce(histogram, &background, &reduce_options)?;

    let normalized = options
        .normalize
        .then(|| time!("Normalization", normalizer.normalize(&colors, true)));

    Ok((colors, normalized))
}

/// Print the palette of an image, followed by its normalized palette
fn print_palette(palette: &ImagePalette, options: &Options, show_path: bool) {
    if show_path {
        println!("{}", palette.path.display());
    }

    println!("{}", format_colors(&palette.colors, options));
    if let Some(normalized) = &palette.normalized {
        println!("{}", format_colors(normalized, options));
    }
}

/// Format a line of colors using the output options
fn format_colors(colors: &ColorCollection, options: &Options) -> String {
    match options.output {
        FormatOutput::Hex => color_format(colors, options, " ", |color| format!("#{}", color.hex())),

        FormatOutput::Rgb => color_format(colors, options, " ", |color| {
            format!("({},{},{})", color.red(), color.green(), color.blue())
        }),

        FormatOutput::Swatch => join_colors(colors, "", |color| {
            "   "
                .on_truecolor(color.red(), color.green(), color.blue())
                .to_string()
        }),
    }
}

/// Format each color and join the results with the delimiter
fn join_colors(
    colors: &ColorCollection,
    delimiter: &str,
    format: impl Fn(&Color) -> String,
) -> String {
    colors
        .iter()
        .map(format)
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Format and then colorize the text for all colors
fn color_format(
    colors: &ColorCollection,
    options: &Options,
    delimiter: &str,
    format: impl Fn(&Color) -> String,
) -> String {
    match options.colorize {
        Some(ColorizeOutput::Fg) => join_colors(colors, delimiter, |color| {
            format(color)
                .truecolor(color.red(), color.green(), color.blue())
                .to_string()
        }),

        Some(ColorizeOutput::Bg) => join_colors(colors, delimiter, |color| {
            format(color)
                .on_truecolor(color.red(), color.green(), color.blue())
                .to_string()
        }),

        None => join_colors(colors, delimiter, format),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgb;

    fn options(args: &[&str]) -> Options {
        Options::try_parse_from(["colorbuckets"].iter().chain(args).chain(&["image.png"])).unwrap()
    }

    /// A white image with a large red block, a smaller blue block and some slightly off red pixels
    fn test_image() -> RgbImage {
        let mut image = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for y in 20..80 {
            for x in 0..100 {
                image.put_pixel(x, y, Rgb([200, 20, 20]));
            }
        }
        for y in 80..90 {
            for x in 0..50 {
                image.put_pixel(x, y, Rgb([20, 20, 200]));
            }
        }
        for x in 0..10 {
            image.put_pixel(x, 95, Rgb([205, 25, 22]));
        }
        image
    }

    #[test]
    fn thumbnail_fits_in_max_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(1000, 400));

        let thumb = generate_thumbnail(image.clone(), 250);
        assert_eq!(thumb.dimensions(), (250, 100));

        let unchanged = generate_thumbnail(image, 1000);
        assert_eq!(unchanged.dimensions(), (1000, 400));
    }

    #[test]
    fn background_is_sampled_from_the_top_edge() {
        let mut image = RgbImage::from_pixel(10, 10, Rgb([1, 2, 3]));
        image.put_pixel(5, 0, Rgb([4, 5, 6]));

        let background = sample_background(&image);
        let colors = background.iter().copied().collect::<Vec<_>>();
        assert_eq!(colors, vec![Color::new(1, 2, 3), Color::new(4, 5, 6)]);

        let uniform = sample_background(&RgbImage::from_pixel(10, 10, Rgb([7, 7, 7])));
        assert_eq!(uniform.len(), 1);

        assert!(sample_background(&RgbImage::new(0, 0)).is_empty());
    }

    #[test]
    fn palette_excludes_background_and_merges_similar_colors() {
        let options = options(&[]);
        let normalizer = Normalizer::default();

        let (colors, normalized) = palette_of(&test_image(), &options, &normalizer).unwrap();
        let colors = colors.iter().copied().collect::<Vec<_>>();

        assert_eq!(
            colors,
            vec![
                Color::new(200, 20, 20).with_weight(6010),
                Color::new(20, 20, 200).with_weight(500),
            ]
        );
        assert!(normalized.is_none());
    }

    #[test]
    fn palette_keeps_background_when_asked() {
        let options = options(&["--no-background", "--no-merge-weights"]);
        let normalizer = Normalizer::default();

        let (colors, _) = palette_of(&test_image(), &options, &normalizer).unwrap();
        let colors = colors.iter().copied().collect::<Vec<_>>();

        assert_eq!(
            colors,
            vec![
                Color::new(200, 20, 20).with_weight(6000),
                Color::new(255, 255, 255).with_weight(3490),
                Color::new(20, 20, 200).with_weight(500),
            ]
        );
    }

    #[test]
    fn normalized_palette_uses_catalog_colors() {
        let options = options(&["-N"]);
        let normalizer = Normalizer::default();

        let (colors, normalized) = palette_of(&test_image(), &options, &normalizer).unwrap();
        let normalized = normalized.unwrap();

        assert!(!normalized.is_empty());
        assert!(normalized.len() <= colors.len());
        for color in &normalized {
            assert!(SwatchCatalog::default_catalog()
                .find(color.footprint())
                .is_some());
        }
    }

    #[test]
    fn custom_catalog_is_loaded_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, "families:\n  - name: mono\n    shades: [\"000000\", \"FFFFFF\"]\n").unwrap();

        let options = options_with_catalog(&path);
        let catalog = load_catalog(&options).unwrap().unwrap();
        assert_eq!(catalog.len(), 2);

        let missing = options_with_catalog(&dir.path().join("missing.yaml"));
        assert!(matches!(
            load_catalog(&missing),
            Err(CliError::CatalogRead { .. })
        ));
    }

    fn options_with_catalog(path: &Path) -> Options {
        let mut options = options(&["-N"]);
        options.catalog = Some(path.to_owned());
        options
    }

    #[test]
    fn generate_palette_writes_strips() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("photo.png");
        test_image().save(&image_path).unwrap();

        let mut options = options(&["-N"]);
        options.write_strips = Some(dir.path().to_owned());

        let palette = generate_palette(&image_path, &options, &Normalizer::default()).unwrap();
        assert_eq!(palette.colors.len(), 2);

        let strip = image::open(dir.path().join("photo_palette.png")).unwrap();
        assert_eq!(strip.dimensions(), (strip::STRIP_WIDTH, 2 * strip::BAND_HEIGHT));
        assert!(dir.path().join("photo_normalized.png").exists());
    }

    #[test]
    fn background_only_images_skip_strips() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("blank.png");
        RgbImage::from_pixel(20, 20, Rgb([9, 9, 9]))
            .save(&image_path)
            .unwrap();

        let mut options = options(&[]);
        options.write_strips = Some(dir.path().to_owned());

        let palette = generate_palette(&image_path, &options, &Normalizer::default()).unwrap();
        assert!(palette.colors.is_empty());
        assert!(!dir.path().join("blank_palette.png").exists());
    }

    #[test]
    fn missing_images_are_reported() {
        let err = load_image(Path::new("does/not/exist.png")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }

    #[test]
    fn formats_hex_and_rgb() {
        let colors = ColorCollection::try_from_colors([Color::new(255, 0, 10), Color::new(1, 2, 3)])
            .unwrap();

        assert_eq!(format_colors(&colors, &options(&[])), "#ff000a #010203");
        assert_eq!(
            format_colors(&colors, &options(&["-o", "rgb"])),
            "(255,0,10) (1,2,3)"
        );
    }
}
