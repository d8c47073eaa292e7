use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};

use tiled_texture::{ResultShape, tile_image, TILE_SIZE};
use tiled_texture::encoder::PngDataUrlEncoder;

fn criterion_benchmark(c: &mut Criterion) {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(3000, 2100, |x, y| {
        Rgba([x as u8, y as u8, (x ^ y) as u8, 255])
    }));

    for compression in [0, 50, 100] {
        let encoder = PngDataUrlEncoder { compression };
        c.bench_function(&format!("tile_3000x2100_compression_{}", compression), |b| {
            b.iter(|| tile_image(&image, TILE_SIZE, ResultShape::Tiles, &encoder).unwrap())
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default()
                .sample_size(10)
                .warm_up_time(Duration::from_millis(500))
                .measurement_time(Duration::from_millis(1500))
                .without_plots();
    targets = criterion_benchmark
}
criterion_main!(benches);
