use colorbuckets::{difference::DeltaE2000, Color, ColorCollection, Normalizer};
use criterion::{
	black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, BenchmarkId, Criterion,
	SamplingMode,
};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::time::Duration;

const PIXEL_COUNTS: [usize; 3] = [62_500, 250_000, 1_000_000];

fn random_pixels(len: usize) -> Vec<Srgb<u8>> {
	let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
	// Draw from a limited set of colors so that the histogram resembles a real image
	let colors = (0..2048).map(|_| Srgb::new(rng.gen(), rng.gen(), rng.gen())).collect::<Vec<_>>();
	(0..len).map(|_| colors[rng.gen_range(0..colors.len())]).collect()
}

fn create_group<'a>(c: &'a mut Criterion, name: &'a str) -> BenchmarkGroup<'a, WallTime> {
	let mut group = c.benchmark_group(name);
	group
		.sample_size(30)
		.noise_threshold(0.05)
		.sampling_mode(SamplingMode::Flat)
		.warm_up_time(Duration::from_millis(500));
	group
}

fn histogram(c: &mut Criterion) {
	let mut group = create_group(c, "histogram");

	for len in PIXEL_COUNTS {
		let pixels = random_pixels(len);

		group.bench_with_input(BenchmarkId::new("sequential", len), &pixels, |b, pixels| {
			b.iter(|| ColorCollection::from_pixels(black_box(pixels)));
		});

		#[cfg(feature = "threads")]
		group.bench_with_input(BenchmarkId::new("parallel", len), &pixels, |b, pixels| {
			b.iter(|| ColorCollection::from_pixels_par(black_box(pixels)));
		});
	}
}

fn combine_similar(c: &mut Criterion) {
	let mut group = create_group(c, "combine_similar");

	let mut histogram = ColorCollection::from_pixels(&random_pixels(PIXEL_COUNTS[1]));
	histogram.sort_by_weight_desc();

	for threshold in [0.05, 0.15, 0.3] {
		group.bench_with_input(BenchmarkId::new("rgb", threshold), &histogram, |b, histogram| {
			b.iter(|| histogram.clone().combine_similar(true, black_box(threshold)).map(|colors| colors.len()));
		});

		group.bench_with_input(BenchmarkId::new("ciede2000", threshold), &histogram, |b, histogram| {
			b.iter(|| {
				histogram
					.clone()
					.combine_similar_by::<DeltaE2000>(true, black_box(threshold))
					.map(|colors| colors.len())
			});
		});
	}
}

fn map_color(c: &mut Criterion) {
	let mut group = create_group(c, "map_color");
	let normalizer = Normalizer::default();

	let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
	let colors = (0..256).map(|_| Color::new(rng.gen(), rng.gen(), rng.gen())).collect::<Vec<_>>();

	group.bench_function("default_catalog", |b| {
		b.iter(|| {
			for color in &colors {
				black_box(normalizer.map_color(black_box(color), true));
			}
		});
	});
}

criterion_group!(benches, histogram, combine_similar, map_color);
criterion_main!(benches);
