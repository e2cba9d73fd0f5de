use crate::mask::AlphaMask;
use crate::math::{Box2D, Point};
use crate::path::{LineSink, Reusable, SinkResult, SinkState};
use crate::RasterOptions;

use std::cmp::Ordering;

/// A non-horizontal edge, oriented top to bottom.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    /// The upper endpoint.
    pub from: Point,
    /// The lower endpoint.
    pub to: Point,
    /// `1` if the segment was going down, `-1` if it was going up.
    pub winding: i32,
}

impl Edge {
    /// Returns `None` for horizontal segments, which don't contribute to the winding
    /// number of any sample.
    pub fn new(from: Point, to: Point) -> Option<Self> {
        match from.y.partial_cmp(&to.y) {
            Some(Ordering::Less) => Some(Edge {
                from,
                to,
                winding: 1,
            }),
            Some(Ordering::Greater) => Some(Edge {
                from: to,
                to: from,
                winding: -1,
            }),
            _ => None,
        }
    }

    /// Horizontal position of the edge at `y`, which must be within its vertical range.
    ///
    /// Computed in double precision so that edges spanning the whole `f32` range don't
    /// overflow.
    #[inline]
    pub fn x_at(&self, y: f32) -> f32 {
        if self.from.x == self.to.x {
            return self.from.x;
        }

        let (x0, y0) = (self.from.x as f64, self.from.y as f64);
        let (x1, y1) = (self.to.x as f64, self.to.y as f64);
        ((x0 * y1 - x1 * y0 + y as f64 * (x1 - x0)) / (y1 - y0)) as f32
    }
}

/// A line sink that accumulates edges and produces coverage masks.
pub struct Renderer {
    width: u32,
    height: u32,
    options: RasterOptions,
    state: SinkState,
    edges: Vec<Edge>,
    // Scratch buffers, kept to avoid allocating at each rasterization.
    crossings: Vec<(f32, i32)>,
    accumulator: Vec<f32>,
}

impl Renderer {
    pub fn new(width: u32, height: u32, options: RasterOptions) -> Self {
        Renderer {
            width,
            height,
            options,
            state: SinkState::new(),
            edges: Vec::new(),
            crossings: Vec::new(),
            accumulator: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Changes the size of the masks produced by `rasterize`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RasterOptions) {
        self.options = options;
    }

    /// The edges accumulated so far, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The bounding box of the accumulated edges, if any.
    pub fn bounds(&self) -> Option<Box2D> {
        if self.edges.is_empty() {
            return None;
        }

        Some(Box2D::from_points(
            self.edges.iter().flat_map(|e| [e.from, e.to]),
        ))
    }

    /// Computes the coverage of the accumulated edges.
    pub fn rasterize(&mut self) -> AlphaMask {
        let mut mask = AlphaMask::new(self.width, self.height);
        self.rasterize_into(&mut mask);

        mask
    }

    /// Computes the coverage of the accumulated edges into an existing mask.
    ///
    /// # Panics
    ///
    /// If the mask's size differs from the renderer's.
    pub fn rasterize_into(&mut self, mask: &mut AlphaMask) {
        assert_eq!((mask.width(), mask.height()), (self.width, self.height));
        mask.clear();

        if self.state.is_disposed() {
            log::warn!("rasterizing a disposed renderer");
            return;
        }

        let bounds = match self.bounds() {
            Some(bounds) => bounds,
            None => return,
        };

        log::debug!(
            "rasterizing {} edges into a {}x{} mask",
            self.edges.len(),
            self.width,
            self.height
        );

        self.edges.sort_by(|a, b| {
            a.from
                .y
                .partial_cmp(&b.from.y)
                .unwrap_or(Ordering::Equal)
        });

        let width = self.width as usize;
        let rows = self.options.subpixel_rows.max(1);
        let sample_weight = 1.0 / rows as f32;
        let first_row = bounds.min.y.floor().max(0.0) as u32;
        let last_row = (bounds.max.y.ceil().max(0.0) as u32).min(self.height);

        self.accumulator.clear();
        self.accumulator.resize(width, 0.0);

        for py in first_row..last_row {
            for sample in 0..rows {
                let y = py as f32 + (sample as f32 + 0.5) * sample_weight;

                self.crossings.clear();
                for edge in &self.edges {
                    if edge.from.y > y {
                        break;
                    }
                    if edge.to.y <= y {
                        continue;
                    }
                    self.crossings.push((edge.x_at(y), edge.winding));
                }

                self.crossings
                    .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

                let mut winding = 0;
                for i in 0..self.crossings.len() {
                    winding += self.crossings[i].1;
                    if !self.options.fill_rule.is_in(winding) {
                        continue;
                    }
                    if let Some(&(next_x, _)) = self.crossings.get(i + 1) {
                        add_span(
                            &mut self.accumulator,
                            self.crossings[i].0,
                            next_x,
                            sample_weight,
                        );
                    }
                }
            }

            let row = &mut mask.data_mut()[py as usize * width..(py as usize + 1) * width];
            for (alpha, coverage) in row.iter_mut().zip(self.accumulator.iter_mut()) {
                *alpha = (coverage.min(1.0) * 255.0).round() as u8;
                *coverage = 0.0;
            }
        }
    }

    fn add_edge(&mut self, from: Point, to: Point) {
        if let Some(edge) = Edge::new(from, to) {
            self.edges.push(edge);
        }
    }

    // Sub-paths are filled as if closed.
    fn close_implicitly(&mut self, current: Option<Point>, start: Option<Point>) {
        if let (Some(current), Some(start)) = (current, start) {
            log::trace!("closing sub-path from {:?} to {:?}", current, start);
            self.add_edge(current, start);
        }
    }
}

/// Adds `weight` times the overlap of `[x0, x1]` with each pixel of the row.
fn add_span(row: &mut [f32], x0: f32, x1: f32, weight: f32) {
    let x0 = x0.max(0.0);
    let x1 = x1.min(row.len() as f32);
    if x0 >= x1 {
        return;
    }

    let first = x0.floor() as usize;
    let last = x1.floor() as usize;

    if first == last {
        row[first] += (x1 - x0) * weight;
        return;
    }

    row[first] += (first as f32 + 1.0 - x0) * weight;
    for coverage in &mut row[first + 1..last] {
        *coverage += weight;
    }
    if last < row.len() {
        row[last] += (x1 - last as f32) * weight;
    }
}

impl LineSink for Renderer {
    fn move_to(&mut self, at: Point) -> SinkResult {
        let current = self.state.current_position();
        let start = self.state.start_position();
        self.state.move_to(at)?;
        self.close_implicitly(current, start);

        Ok(())
    }

    fn line_join(&mut self) -> SinkResult {
        self.state.line_join()?;

        Ok(())
    }

    fn line_to(&mut self, to: Point) -> SinkResult {
        let from = self.state.line_to(to)?;
        self.add_edge(from, to);

        Ok(())
    }

    fn close(&mut self) -> SinkResult {
        let (from, to) = self.state.close()?;
        self.add_edge(from, to);

        Ok(())
    }

    fn end(&mut self) -> SinkResult {
        let current = self.state.current_position();
        let start = self.state.start_position();
        self.state.end()?;
        self.close_implicitly(current, start);

        Ok(())
    }

    fn dispose(&mut self) {
        if self.state.dispose() {
            log::debug!("renderer disposed");
            self.edges = Vec::new();
            self.crossings = Vec::new();
            self.accumulator = Vec::new();
        }
    }
}

impl Reusable for Renderer {
    fn reset(&mut self) {
        self.state.reset();
        self.edges.clear();
    }

    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }
}

#[cfg(test)]
use crate::math::point;
#[cfg(test)]
use crate::path::{FillRule, SinkError, Verb};

#[cfg(test)]
fn renderer(width: u32, height: u32) -> Renderer {
    let _ = env_logger::builder().is_test(true).try_init();
    Renderer::new(width, height, RasterOptions::default())
}

#[cfg(test)]
fn rect(renderer: &mut Renderer, x0: f32, y0: f32, x1: f32, y1: f32) {
    renderer.move_to(point(x0, y0)).unwrap();
    renderer.line_to(point(x1, y0)).unwrap();
    renderer.line_to(point(x1, y1)).unwrap();
    renderer.line_to(point(x0, y1)).unwrap();
    renderer.close().unwrap();
}

#[test]
fn pixel_aligned_square() {
    let mut renderer = renderer(4, 4);
    rect(&mut renderer, 1.0, 1.0, 3.0, 3.0);
    renderer.end().unwrap();

    let mask = renderer.rasterize();
    for y in 0..4 {
        for x in 0..4 {
            let inside = (1..3).contains(&x) && (1..3).contains(&y);
            assert_eq!(mask.get(x, y), if inside { 255 } else { 0 }, "{:?}", mask);
        }
    }
    assert_eq!(mask.covered_area(), 4.0);
}

#[test]
fn partial_coverage() {
    let mut renderer = renderer(4, 2);
    rect(&mut renderer, 0.0, 0.0, 2.5, 2.0);
    renderer.end().unwrap();

    let mask = renderer.rasterize();
    assert_eq!(mask.row(0), &[255, 255, 128, 0]);
    assert_eq!(mask.row(1), &[255, 255, 128, 0]);

    // Half a pixel vertically, sampled on 4 rows.
    let mut renderer = self::renderer(2, 2);
    rect(&mut renderer, 0.0, 0.5, 2.0, 2.0);
    renderer.end().unwrap();

    let mask = renderer.rasterize();
    assert_eq!(mask.row(0), &[128, 128]);
    assert_eq!(mask.row(1), &[255, 255]);
}

#[test]
fn fill_rules() {
    // Two squares with the same orientation, one inside the other.
    let build = |options| {
        let mut renderer = Renderer::new(6, 6, options);
        rect(&mut renderer, 0.0, 0.0, 6.0, 6.0);
        rect(&mut renderer, 2.0, 2.0, 4.0, 4.0);
        renderer.end().unwrap();
        renderer.rasterize()
    };

    let non_zero = build(RasterOptions::non_zero());
    let even_odd = build(RasterOptions::even_odd());

    assert_eq!(non_zero.get(3, 3), 255);
    assert_eq!(even_odd.get(3, 3), 0);
    assert_eq!(non_zero.get(0, 0), 255);
    assert_eq!(even_odd.get(0, 0), 255);
    assert_eq!(non_zero.covered_area(), 36.0);
    assert_eq!(even_odd.covered_area(), 32.0);
}

#[test]
fn open_sub_paths_are_closed_implicitly() {
    let mut renderer = renderer(4, 4);
    renderer.move_to(point(0.0, 0.0)).unwrap();
    renderer.line_to(point(2.0, 0.0)).unwrap();
    renderer.line_to(point(2.0, 2.0)).unwrap();
    renderer.line_to(point(0.0, 2.0)).unwrap();
    // Implicitly closed by the move_to.
    renderer.move_to(point(2.0, 2.0)).unwrap();
    renderer.line_to(point(4.0, 2.0)).unwrap();
    renderer.line_to(point(4.0, 4.0)).unwrap();
    renderer.line_to(point(2.0, 4.0)).unwrap();
    // Implicitly closed by the end.
    renderer.end().unwrap();

    assert_eq!(renderer.edges().len(), 4);
    let mask = renderer.rasterize();
    assert_eq!(mask.get(0, 0), 255);
    assert_eq!(mask.get(3, 3), 255);
    assert_eq!(mask.get(3, 0), 0);
    assert_eq!(mask.covered_area(), 8.0);
}

#[test]
fn close_then_line_to() {
    let mut renderer = renderer(4, 4);
    renderer.move_to(point(0.0, 0.0)).unwrap();
    renderer.line_to(point(2.0, 0.0)).unwrap();
    renderer.line_to(point(2.0, 2.0)).unwrap();
    renderer.close().unwrap();
    renderer.line_to(point(0.0, 2.0)).unwrap();
    renderer.line_join().unwrap();
    renderer.line_to(point(2.0, 2.0)).unwrap();
    renderer.end().unwrap();

    // Two triangles with two non-horizontal edges each, covering the square.
    assert_eq!(renderer.edges().len(), 4);
    let mask = renderer.rasterize();
    assert_eq!(mask.covered_area(), 4.0);
}

#[test]
fn edges_and_bounds() {
    let mut renderer = renderer(8, 8);
    assert!(renderer.is_empty());
    assert_eq!(renderer.bounds(), None);

    renderer.move_to(point(1.0, 2.0)).unwrap();
    renderer.line_to(point(5.0, 2.0)).unwrap();
    renderer.line_to(point(3.0, 7.0)).unwrap();
    renderer.close().unwrap();

    assert!(!renderer.is_empty());
    assert_eq!(
        renderer.edges()[0],
        Edge {
            from: point(5.0, 2.0),
            to: point(3.0, 7.0),
            winding: 1
        }
    );
    assert_eq!(renderer.edges()[1].winding, -1);
    assert_eq!(
        renderer.bounds(),
        Some(Box2D {
            min: point(1.0, 2.0),
            max: point(5.0, 7.0)
        })
    );
}

#[test]
fn shapes_outside_of_the_mask() {
    let mut renderer = renderer(4, 4);
    rect(&mut renderer, -10.0, -10.0, -2.0, 20.0);
    rect(&mut renderer, 2.0, -3.0, 10.0, 1.0);
    renderer.end().unwrap();

    let mask = renderer.rasterize();
    assert_eq!(mask.row(0), &[0, 0, 255, 255]);
    assert_eq!(mask.covered_area(), 2.0);
}

#[test]
fn reset_and_dispose() {
    let mut renderer = renderer(4, 4);
    rect(&mut renderer, 0.0, 0.0, 4.0, 4.0);
    renderer.reset();

    assert!(renderer.is_empty());
    assert_eq!(
        renderer.line_to(point(1.0, 1.0)),
        Err(SinkError::IllegalState { verb: Verb::LineTo })
    );
    assert_eq!(renderer.rasterize().covered_area(), 0.0);

    renderer.dispose();
    renderer.dispose();
    assert!(renderer.is_disposed());
    assert_eq!(
        renderer.move_to(point(0.0, 0.0)),
        Err(SinkError::UseAfterDispose { verb: Verb::MoveTo })
    );
    assert_eq!(renderer.rasterize().covered_area(), 0.0);
}

#[test]
fn edges_spanning_the_float_range() {
    let mut renderer = renderer(4, 4);
    renderer.move_to(point(-3e38, -3e38)).unwrap();
    renderer.line_to(point(3e38, 3e38)).unwrap();
    renderer.line_to(point(-3e38, 3e38)).unwrap();
    renderer.close().unwrap();
    renderer.end().unwrap();

    let edge = renderer.edges()[0];
    assert!((edge.x_at(2.5) - 2.5).abs() < 1e-3);

    // Everything below the diagonal is covered.
    let mask = renderer.rasterize();
    assert_eq!(mask.get(0, 3), 255);
    assert_eq!(mask.get(1, 2), 255);
    assert_eq!(mask.get(3, 0), 0);
    assert_eq!(mask.get(2, 1), 0);
    assert!((mask.covered_area() - 8.0).abs() < 0.1, "{:?}", mask);
}

#[test]
fn fill_rule_is_reexported() {
    let options = RasterOptions::default().with_fill_rule(FillRule::EvenOdd);
    assert_eq!(Renderer::new(1, 1, options).options().fill_rule, FillRule::EvenOdd);
}
