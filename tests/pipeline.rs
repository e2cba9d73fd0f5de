use linework::geom::LineSegment;
use linework::math::{point, Point, Transform};
use linework::path::{
    Command, Flattener, LineSink, NullSink, Recorder, SinkError, SinkPool, SinkResult, Transformed,
    Validated, Verb,
};
use linework::raster::{RasterOptions, Renderer};
use linework::stroke::{LineCap, StrokeOptions, Stroker};
use linework::{fill_path, stroke_path, Canvas};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn count(commands: &[Command], verb: Verb) -> usize {
    commands.iter().filter(|cmd| cmd.verb() == verb).count()
}

#[test]
fn recorded_sequence() {
    init_logger();

    let mut sink = Recorder::new();
    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.line_to(point(10.0, 0.0)).unwrap();
    sink.line_join().unwrap();
    sink.line_to(point(10.0, 10.0)).unwrap();
    sink.close().unwrap();
    sink.end().unwrap();
    sink.dispose();

    assert_eq!(
        sink.commands(),
        &[
            Command::MoveTo(point(0.0, 0.0)),
            Command::LineTo(point(10.0, 0.0)),
            Command::LineJoin,
            Command::LineTo(point(10.0, 10.0)),
            Command::Close,
            Command::End,
            Command::Dispose,
        ]
    );
}

#[test]
fn line_to_after_close() {
    init_logger();

    let mut sink = Recorder::new();
    sink.move_to(point(0.0, 0.0)).unwrap();
    sink.line_to(point(10.0, 0.0)).unwrap();
    sink.close().unwrap();
    sink.line_to(point(10.0, 10.0)).unwrap();
    sink.end().unwrap();

    let segment = |from: Point, to: Point| LineSegment { from, to };
    assert_eq!(
        sink.segments(),
        &[
            segment(point(0.0, 0.0), point(10.0, 0.0)),
            segment(point(10.0, 0.0), point(0.0, 0.0)),
            segment(point(0.0, 0.0), point(10.0, 10.0)),
        ]
    );
}

#[test]
fn protocol_violations_are_reported_at_the_offending_call() {
    init_logger();

    let sinks: Vec<Box<dyn LineSink>> = vec![
        Box::new(Recorder::new()),
        Box::new(Validated::new(NullSink::new())),
        Box::new(Transformed::new(Recorder::new(), Transform::identity())),
        Box::new(Stroker::new(Recorder::new(), StrokeOptions::default())),
        Box::new(Renderer::new(4, 4, RasterOptions::default())),
    ];

    for mut sink in sinks {
        assert_eq!(
            sink.line_to(point(1.0, 1.0)),
            Err(SinkError::IllegalState { verb: Verb::LineTo })
        );
        assert_eq!(
            sink.close(),
            Err(SinkError::IllegalState { verb: Verb::Close })
        );
        assert_eq!(
            sink.move_to(point(std::f32::NAN, 0.0)),
            Err(SinkError::InvalidArgument { verb: Verb::MoveTo })
        );
        // No-ops outside of a sub-path.
        sink.line_join().unwrap();
        sink.end().unwrap();

        sink.move_to(point(0.0, 0.0)).unwrap();
        sink.close().unwrap();
        sink.end().unwrap();

        sink.dispose();
        sink.dispose();
        assert_eq!(
            sink.move_to(point(0.0, 0.0)),
            Err(SinkError::UseAfterDispose { verb: Verb::MoveTo })
        );
        assert_eq!(
            sink.line_to(point(std::f32::INFINITY, 0.0)),
            Err(SinkError::UseAfterDispose { verb: Verb::LineTo })
        );
    }
}

#[test]
fn pass_through_forwards_one_command_per_command() {
    init_logger();

    fn draw(sink: &mut dyn LineSink) {
        sink.line_join().unwrap();
        sink.move_to(point(1.0, 1.0)).unwrap();
        sink.line_join().unwrap();
        sink.line_to(point(2.0, 1.0)).unwrap();
        sink.line_join().unwrap();
        sink.line_to(point(2.0, 2.0)).unwrap();
        sink.close().unwrap();
        sink.line_to(point(0.0, 0.0)).unwrap();
        sink.end().unwrap();
        sink.end().unwrap();
        sink.dispose();
        sink.dispose();
    }

    let mut direct = Recorder::new();
    draw(&mut direct);

    let mut forwarded = Transformed::new(Recorder::new(), Transform::scale(2.0, 2.0));
    draw(&mut forwarded);
    let forwarded = forwarded.into_inner();

    assert_eq!(direct.commands().len(), 9);
    assert_eq!(forwarded.commands().len(), direct.commands().len());
    for (a, b) in direct.commands().iter().zip(forwarded.commands()) {
        assert_eq!(a.verb(), b.verb());
        assert_eq!(a.position().map(|p| p * 2.0), b.position());
    }
}

#[test]
fn flattened_curves_through_the_stroker() {
    init_logger();

    let options = StrokeOptions::default()
        .with_line_width(2.0)
        .with_line_cap(LineCap::Round);
    let mut flattener = Flattener::new(Stroker::new(Recorder::new(), options), 0.05);

    flattener.move_to(point(0.0, 0.0)).unwrap();
    flattener.line_to(point(10.0, 0.0)).unwrap();
    flattener
        .cubic_bezier_to(point(15.0, 0.0), point(15.0, 10.0), point(10.0, 10.0))
        .unwrap();
    flattener.end().unwrap();

    flattener.move_to(point(20.0, 0.0)).unwrap();
    flattener
        .quadratic_bezier_to(point(30.0, 0.0), point(30.0, 10.0))
        .unwrap();
    flattener.close().unwrap();
    flattener.end().unwrap();
    flattener.dispose();

    let outline = flattener.into_inner().into_inner();
    let commands = outline.commands();

    // Joins are consumed by the stroker.
    assert_eq!(count(commands, Verb::LineJoin), 0);
    // One contour for the open sub-path, two for the closed one.
    assert_eq!(count(commands, Verb::MoveTo), 3);
    assert_eq!(count(commands, Verb::Close), 3);
    assert_eq!(count(commands, Verb::End), 2);
    assert_eq!(count(commands, Verb::Dispose), 1);
    assert_eq!(commands.last(), Some(&Command::Dispose));
}

#[test]
fn fill_a_circle() {
    init_logger();

    let k = 0.552_284_8 * 3.0;
    let canvas = Canvas::new(8, 8).with_tolerance(0.01);
    let mask = canvas
        .fill(&RasterOptions::default(), |path| {
            path.move_to(point(7.0, 4.0))?;
            path.cubic_bezier_to(point(7.0, 4.0 + k), point(4.0 + k, 7.0), point(4.0, 7.0))?;
            path.cubic_bezier_to(point(4.0 - k, 7.0), point(1.0, 4.0 + k), point(1.0, 4.0))?;
            path.cubic_bezier_to(point(1.0, 4.0 - k), point(4.0 - k, 1.0), point(4.0, 1.0))?;
            path.cubic_bezier_to(point(4.0 + k, 1.0), point(7.0, 4.0 - k), point(7.0, 4.0))?;
            path.close()
        })
        .unwrap();

    let area = std::f32::consts::PI * 9.0;
    assert!((mask.covered_area() - area).abs() < 0.3, "{:?}", mask);
    assert_eq!(mask.get(3, 3), 255);
    assert_eq!(mask.get(4, 4), 255);
    assert_eq!(mask.get(0, 0), 0);
    assert_eq!(mask.get(7, 7), 0);
}

#[test]
fn stroke_a_line() {
    init_logger();

    let options = StrokeOptions::default().with_line_width(2.0);
    let mask = stroke_path(8, 8, &options, |path| {
        path.move_to(point(1.0, 4.0))?;
        path.line_to(point(7.0, 4.0))
    })
    .unwrap();

    assert_eq!(mask.covered_area(), 12.0);
    for x in 1..7 {
        assert_eq!(mask.get(x, 3), 255);
        assert_eq!(mask.get(x, 4), 255);
        assert_eq!(mask.get(x, 2), 0);
        assert_eq!(mask.get(x, 5), 0);
    }
    assert_eq!(mask.get(0, 3), 0);
    assert_eq!(mask.get(7, 4), 0);
}

#[test]
fn stroke_a_closed_square() {
    init_logger();

    let options = StrokeOptions::default().with_line_width(2.0);
    let mask = stroke_path(8, 8, &options, |path| {
        path.move_to(point(2.0, 2.0))?;
        path.line_to(point(6.0, 2.0))?;
        path.line_to(point(6.0, 6.0))?;
        path.line_to(point(2.0, 6.0))?;
        path.close()
    })
    .unwrap();

    // A 6x6 square with a 2x2 hole, with mitered corners.
    assert!((mask.covered_area() - 32.0).abs() < 0.01, "{:?}", mask);
    assert_eq!(mask.get(1, 1), 255);
    assert_eq!(mask.get(6, 1), 255);
    assert_eq!(mask.get(6, 6), 255);
    assert_eq!(mask.get(3, 3), 0);
    assert_eq!(mask.get(4, 4), 0);
    assert_eq!(mask.get(0, 0), 0);
}

#[test]
fn transformed_fill() {
    init_logger();

    let mut renderer = Renderer::new(8, 8, RasterOptions::default());
    {
        let mut sink = Transformed::new(&mut renderer, Transform::scale(2.0, 2.0));
        sink.move_to(point(1.0, 1.0)).unwrap();
        sink.line_to(point(2.0, 1.0)).unwrap();
        sink.line_to(point(2.0, 2.0)).unwrap();
        sink.line_to(point(1.0, 2.0)).unwrap();
        sink.end().unwrap();
    }

    let mask = renderer.rasterize();
    assert_eq!(mask.covered_area(), 4.0);
    assert_eq!(mask.get(2, 2), 255);
    assert_eq!(mask.get(3, 3), 255);
    assert_eq!(mask.get(1, 1), 0);
}

#[test]
fn fill_rules_through_the_facade() {
    init_logger();

    fn star(path: &mut Flattener<&mut Renderer>) -> SinkResult {
        path.move_to(point(8.0, 0.0))?;
        path.line_to(point(13.0, 16.0))?;
        path.line_to(point(0.0, 6.0))?;
        path.line_to(point(16.0, 6.0))?;
        path.line_to(point(3.0, 16.0))?;
        path.close()
    }

    let non_zero = fill_path(16, 16, &RasterOptions::non_zero(), star).unwrap();
    let even_odd = fill_path(16, 16, &RasterOptions::even_odd(), star).unwrap();

    // The pentagon in the middle of the star is covered twice.
    assert_eq!(non_zero.get(8, 8), 255);
    assert_eq!(even_odd.get(8, 8), 0);
    assert!(non_zero.covered_area() > even_odd.covered_area());
}

#[test]
fn pooled_renderers() {
    init_logger();

    let pool = SinkPool::new(|| Renderer::new(4, 4, RasterOptions::default()));

    {
        let mut a = pool.acquire();
        let mut b = pool.acquire();

        b.move_to(point(0.0, 0.0)).unwrap();
        a.dispose();
        a.dispose();
        b.line_to(point(4.0, 0.0)).unwrap();
        b.line_to(point(4.0, 4.0)).unwrap();
        b.line_to(point(0.0, 4.0)).unwrap();
        b.end().unwrap();

        assert_eq!(b.rasterize().covered_area(), 16.0);
    }

    assert_eq!(pool.idle_count(), 1);
    let mut renderer = pool.acquire();
    assert!(renderer.is_empty());
    assert_eq!(renderer.rasterize().covered_area(), 0.0);
}
