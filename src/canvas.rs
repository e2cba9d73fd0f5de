use crate::path::{Flattener, SinkError, SinkPool, SinkResult};
use crate::raster::{AlphaMask, RasterOptions, Renderer};
use crate::stroke::{StrokeOptions, Stroker};

/// Draws paths into coverage masks of a fixed size.
///
/// Renderers are kept in a pool between paths so that their buffers are reused.
/// A canvas can be shared between threads, each call checks out its own renderer.
pub struct Canvas {
    width: u32,
    height: u32,
    tolerance: f32,
    renderers: SinkPool<Renderer>,
}

impl Canvas {
    /// Default flattening tolerance, in pixels.
    pub const DEFAULT_TOLERANCE: f32 = 0.1;

    pub fn new(width: u32, height: u32) -> Self {
        Canvas {
            width,
            height,
            tolerance: Self::DEFAULT_TOLERANCE,
            renderers: SinkPool::new(move || Renderer::new(width, height, RasterOptions::DEFAULT)),
        }
    }

    /// Sets the maximum distance between curves and their approximation.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        assert!(tolerance.is_finite() && tolerance > 0.0);
        self.tolerance = tolerance;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Number of renderers waiting to be reused.
    pub fn idle_renderers(&self) -> usize {
        self.renderers.idle_count()
    }

    /// Fills the path described by `draw`.
    ///
    /// The path is ended after `draw` returns, so a trailing `end` is optional. If
    /// `draw` fails, its error is returned and nothing is rendered.
    pub fn fill<F>(&self, options: &RasterOptions, draw: F) -> Result<AlphaMask, SinkError>
    where
        F: FnOnce(&mut Flattener<&mut Renderer>) -> SinkResult,
    {
        let mut renderer = self.renderers.acquire();
        renderer.set_options(*options);

        let mut flattener = Flattener::new(&mut *renderer, self.tolerance);
        draw(&mut flattener)?;
        flattener.end()?;

        log::debug!("filled {} edges", renderer.edges().len());

        Ok(renderer.rasterize())
    }

    /// Strokes the path described by `draw`.
    ///
    /// The outline is filled with the non-zero fill rule.
    pub fn stroke<F>(&self, options: &StrokeOptions, draw: F) -> Result<AlphaMask, SinkError>
    where
        F: FnOnce(&mut Flattener<Stroker<&mut Renderer>>) -> SinkResult,
    {
        let mut renderer = self.renderers.acquire();
        renderer.set_options(RasterOptions::non_zero());

        let mut flattener = Flattener::new(Stroker::new(&mut *renderer, *options), self.tolerance);
        draw(&mut flattener)?;
        flattener.end()?;

        log::debug!("stroked into {} edges", renderer.edges().len());

        Ok(renderer.rasterize())
    }
}

#[cfg(test)]
use crate::math::point;
#[cfg(test)]
use crate::path::Verb;

#[test]
fn renderers_are_reused() {
    fn square(path: &mut Flattener<&mut Renderer>) -> SinkResult {
        path.move_to(point(0.0, 0.0))?;
        path.line_to(point(2.0, 0.0))?;
        path.line_to(point(2.0, 2.0))?;
        path.line_to(point(0.0, 2.0))?;
        path.close()
    }

    let canvas = Canvas::new(4, 4);

    let first = canvas.fill(&RasterOptions::default(), square).unwrap();
    assert_eq!(canvas.idle_renderers(), 1);
    let second = canvas.fill(&RasterOptions::default(), square).unwrap();
    assert_eq!(canvas.idle_renderers(), 1);

    // Nothing from the first path leaks into the second.
    assert_eq!(first, second);
    assert_eq!(second.covered_area(), 4.0);
}

#[test]
fn errors_release_the_renderer() {
    let canvas = Canvas::new(4, 4);

    let result = canvas.fill(&RasterOptions::default(), |path| {
        path.move_to(point(0.0, 0.0))?;
        path.end()?;
        path.line_to(point(1.0, 1.0))
    });

    assert_eq!(result, Err(SinkError::IllegalState { verb: Verb::LineTo }));
    assert_eq!(canvas.idle_renderers(), 1);

    let empty = canvas.fill(&RasterOptions::default(), |_| Ok(())).unwrap();
    assert_eq!(empty.covered_area(), 0.0);
}

#[test]
fn disposed_renderers_are_not_reused() {
    let canvas = Canvas::new(4, 4);

    let result = canvas.fill(&RasterOptions::default(), |path| {
        path.move_to(point(0.0, 0.0))?;
        path.line_to(point(2.0, 2.0))?;
        path.dispose();
        Ok(())
    });

    // The path can't be ended once disposed.
    assert_eq!(result, Err(SinkError::UseAfterDispose { verb: Verb::End }));
    assert_eq!(canvas.idle_renderers(), 0);
}
