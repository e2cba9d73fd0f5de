#[macro_use]
extern crate criterion;

use criterion::Criterion;
use linework::math::point;
use linework::path::{Flattener, LineSink, NullSink, SinkResult};
use linework::raster::RasterOptions;
use linework::stroke::{LineCap, LineJoin, StrokeOptions, Stroker};
use linework::Canvas;

const N: usize = 10;

fn wave<S: LineSink>(path: &mut Flattener<S>) -> SinkResult {
    path.move_to(point(4.0, 64.0))?;
    for i in 0..8 {
        let x = 4.0 + i as f32 * 15.0;
        path.cubic_bezier_to(point(x + 5.0, 4.0), point(x + 10.0, 124.0), point(x + 15.0, 64.0))?;
    }
    path.line_to(point(124.0, 124.0))?;
    path.line_to(point(4.0, 124.0))?;
    path.close()
}

fn flatten(bench: &mut Criterion) {
    bench.bench_function("flatten wave", |b| {
        b.iter(|| {
            for _ in 0..N {
                let mut flattener = Flattener::new(NullSink::new(), 0.05);
                wave(&mut flattener).unwrap();
                flattener.end().unwrap();
            }
        })
    });
}

fn stroke(bench: &mut Criterion) {
    let options = StrokeOptions::default()
        .with_line_width(4.0)
        .with_line_cap(LineCap::Round)
        .with_line_join(LineJoin::Round);

    bench.bench_function("stroke wave", |b| {
        b.iter(|| {
            for _ in 0..N {
                let mut flattener = Flattener::new(Stroker::new(NullSink::new(), options), 0.05);
                wave(&mut flattener).unwrap();
                flattener.end().unwrap();
            }
        })
    });
}

fn rasterize(bench: &mut Criterion) {
    let canvas = Canvas::new(128, 128);

    bench.bench_function("fill wave 128x128", |b| {
        b.iter(|| {
            let mask = canvas.fill(&RasterOptions::default(), |path| wave(path)).unwrap();
            std::hint::black_box(mask);
        })
    });

    let options = StrokeOptions::default().with_line_width(4.0);
    bench.bench_function("stroke wave 128x128", |b| {
        b.iter(|| {
            let mask = canvas.stroke(&options, |path| wave(path)).unwrap();
            std::hint::black_box(mask);
        })
    });
}

criterion_group!(benches, flatten, stroke, rasterize);
criterion_main!(benches);
