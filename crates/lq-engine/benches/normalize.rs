use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lq_core::frame::{NamedImage, PixelBuffer};
use lq_engine::normalize::normalize;
use lq_engine::session::Session;

fn gradient(size: u32, offset: u32) -> PixelBuffer {
    let data = (0..size * size)
        .map(|i| ((i % size + offset) % 256) as u8)
        .collect();
    PixelBuffer {
        data,
        width: size,
        height: size,
    }
}

fn bench_normalize(c: &mut Criterion) {
    let image = NamedImage::new("gradient", gradient(256, 0));
    c.bench_function("normalize_256x256", |b| {
        b.iter(|| normalize(black_box(&image), black_box(180.0)));
    });

    let batch: Vec<NamedImage> = (0..10)
        .map(|i| NamedImage::new(format!("image{i}.png"), gradient(256, i * 20)))
        .collect();
    let parallel = Session::new();
    let sequential = Session::new().with_parallel(false);
    c.bench_function("session_10x256x256_parallel", |b| {
        b.iter(|| parallel.run(black_box(&batch), None));
    });
    c.bench_function("session_10x256x256_sequential", |b| {
        b.iter(|| sequential.run(black_box(&batch), None));
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
