use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oledpack_core::{Layout, RasterFrame, binarize, pack};

fn gradient(width: u32, height: u32) -> RasterFrame {
    let samples = (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x * 255 / width.max(1)) ^ (y * 3)) as u8))
        .collect();
    RasterFrame::from_luma(width, height, samples).unwrap()
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("binarize_pack");
    for (width, height) in [(128, 64), (128, 128), (800, 480)] {
        let frame = gradient(width, height);
        group.throughput(Throughput::Elements((width * height) as u64));
        for layout in [Layout::Horizontal, Layout::Vertical] {
            group.bench_with_input(
                BenchmarkId::new(layout.to_string(), format!("{width}x{height}")),
                &frame,
                |b, frame| {
                    b.iter(|| {
                        let mask = binarize(black_box(frame), 128, false);
                        pack(&mask, layout)
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_pack);
criterion_main!(benches);
