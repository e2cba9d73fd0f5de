use crate::math::{vector, Point, Vector};
use crate::path::{LineSink, Reusable, SinkResult, SinkState};
use crate::{LineCap, LineJoin, StrokeOptions};

use std::f32::consts::PI;

// Segments shorter than this are skipped.
const MIN_SEGMENT_LENGTH: f32 = 1e-5;

/// A line sink that expands the commands it receives into a stroke outline.
///
/// The outline is emitted into the output sink as closed polygons:
///
/// - an open sub-path produces a single contour going along one side, around the end
///   cap, back along the other side and around the start cap,
/// - a closed sub-path produces one contour per side, with opposite orientations,
/// - a sub-path without any segment produces a dot if the start cap is `Round` or
///   `Square`, and nothing otherwise.
///
/// `end` and `dispose` are forwarded to the output. `line_join` hints are consumed.
pub struct Stroker<S> {
    output: S,
    options: StrokeOptions,
    state: SinkState,
    half_width: f32,

    in_sub_path: bool,
    start: Point,
    previous: Point,
    first_direction: Option<Vector>,
    previous_direction: Option<Vector>,
    join_pending: bool,
    drawn: bool,

    left: Vec<Point>,
    right: Vec<Point>,
    scratch: Vec<Point>,
}

impl<S: LineSink> Stroker<S> {
    pub fn new(output: S, options: StrokeOptions) -> Self {
        Stroker {
            output,
            options,
            state: SinkState::new(),
            half_width: options.line_width * 0.5,
            in_sub_path: false,
            start: Point::new(0.0, 0.0),
            previous: Point::new(0.0, 0.0),
            first_direction: None,
            previous_direction: None,
            join_pending: false,
            drawn: false,
            left: Vec::new(),
            right: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn options(&self) -> &StrokeOptions {
        &self.options
    }

    /// Changes the stroke parameters.
    ///
    /// Takes effect from the next sub-path. Must not be called mid sub-path.
    pub fn set_options(&mut self, options: StrokeOptions) {
        debug_assert!(!self.state.is_open());
        self.options = options;
        self.half_width = options.line_width * 0.5;
    }

    pub fn output(&self) -> &S {
        &self.output
    }

    pub fn into_inner(self) -> S {
        self.output
    }

    fn begin_sub_path(&mut self, at: Point) {
        self.clear_sub_path();
        self.in_sub_path = true;
        self.drawn = false;
        self.start = at;
        self.previous = at;
    }

    fn clear_sub_path(&mut self) {
        self.first_direction = None;
        self.previous_direction = None;
        self.join_pending = false;
        self.left.clear();
        self.right.clear();
    }

    fn edge_to(&mut self, to: Point) {
        let from = self.previous;
        let d = to - from;
        let length = d.length();
        if length <= MIN_SEGMENT_LENGTH {
            return;
        }

        let direction = d / length;
        let n = normal(direction) * self.half_width;

        match self.previous_direction {
            None => {
                self.first_direction = Some(direction);
                self.left.push(from + n);
                self.right.push(from - n);
            }
            Some(previous_direction) => {
                let explicit = self.join_pending;
                self.add_join(from, previous_direction, direction, explicit);
            }
        }

        self.left.push(to + n);
        self.right.push(to - n);

        self.previous_direction = Some(direction);
        self.previous = to;
        self.join_pending = false;
    }

    /// Connects the offset polylines at `at`, where the stroke turns from `d0` to `d1`.
    ///
    /// Both polylines already end with the offsets of the incoming segment.
    fn add_join(&mut self, at: Point, d0: Vector, d1: Vector, explicit: bool) {
        let hw = self.half_width;
        let n0 = normal(d0) * hw;
        let n1 = normal(d1) * hw;
        let cross = d0.cross(d1);

        if cross.abs() < 1e-6 && d0.dot(d1) > 0.0 {
            // Straight continuation, the offsets already line up.
            return;
        }

        if !explicit {
            self.left.push(at + n1);
            self.right.push(at - n1);
            return;
        }

        // Normals point to the left of the direction, so a left turn has its outer
        // side on the right.
        let (outer, inner, from, to) = if cross > 0.0 {
            (&mut self.right, &mut self.left, -n0, -n1)
        } else {
            (&mut self.left, &mut self.right, n0, n1)
        };

        inner.push(if cross > 0.0 { at + n1 } else { at - n1 });

        match self.options.line_join {
            LineJoin::Bevel => {}
            LineJoin::Miter => {
                let mid = from + to;
                let mid_length = mid.length();
                let cos_half = mid_length / (2.0 * hw);
                if cos_half > 1e-6 && 1.0 / cos_half <= self.options.miter_limit {
                    outer.push(at + mid * (hw / (cos_half * mid_length)));
                }
            }
            LineJoin::Round => {
                let sweep = from.cross(to).atan2(from.dot(to));
                add_arc(outer, at, from, sweep, self.options.tolerance);
                // add_arc ends on the join's last point.
                outer.pop();
            }
        }

        outer.push(at + to);
    }

    fn close_sub_path(&mut self) -> SinkResult {
        match (self.first_direction, self.previous_direction) {
            (Some(first), Some(last)) => {
                self.add_join(self.start, last, first, true);

                log::trace!(
                    "stroking closed sub-path with {} + {} points",
                    self.left.len(),
                    self.right.len()
                );

                remove_closing_duplicate(&mut self.left);
                remove_closing_duplicate(&mut self.right);

                emit_polygon(&mut self.output, self.left.iter().cloned())?;
                emit_polygon(&mut self.output, self.right.iter().rev().cloned())?;
                self.drawn = true;
            }
            _ => {
                if !self.drawn {
                    self.add_dot(self.start)?;
                }
            }
        }

        // The sub-path goes on from its start position.
        let start = self.start;
        let drawn = self.drawn;
        self.begin_sub_path(start);
        self.drawn = drawn;

        Ok(())
    }

    fn finish_open_sub_path(&mut self) -> SinkResult {
        if !self.in_sub_path {
            return Ok(());
        }
        self.in_sub_path = false;

        let (first, last) = match (self.first_direction, self.previous_direction) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                if !self.drawn {
                    self.add_dot(self.start)?;
                }
                self.clear_sub_path();
                return Ok(());
            }
        };

        log::trace!(
            "stroking open sub-path with {} + {} points",
            self.left.len(),
            self.right.len()
        );

        let hw = self.half_width;
        let tolerance = self.options.tolerance;

        self.scratch.clear();
        self.scratch.extend(self.left.iter().cloned());
        add_cap(
            &mut self.scratch,
            self.previous,
            last,
            hw,
            self.options.end_cap,
            tolerance,
        );
        self.scratch.extend(self.right.iter().rev().cloned());
        add_cap(
            &mut self.scratch,
            self.start,
            -first,
            hw,
            self.options.start_cap,
            tolerance,
        );

        emit_polygon(&mut self.output, self.scratch.iter().cloned())?;
        self.drawn = true;
        self.clear_sub_path();

        Ok(())
    }

    fn add_dot(&mut self, at: Point) -> SinkResult {
        let hw = self.half_width;
        if hw <= 0.0 {
            return Ok(());
        }

        self.scratch.clear();
        match self.options.start_cap {
            LineCap::Butt => {
                return Ok(());
            }
            LineCap::Square => {
                self.scratch.extend_from_slice(&[
                    at + vector(-hw, -hw),
                    at + vector(hw, -hw),
                    at + vector(hw, hw),
                    at + vector(-hw, hw),
                ]);
            }
            LineCap::Round => {
                let from = vector(hw, 0.0);
                self.scratch.push(at + from);
                add_arc(&mut self.scratch, at, from, 2.0 * PI, self.options.tolerance);
                self.scratch.pop();
            }
        }

        log::trace!("stroking zero-length sub-path at {:?}", at);
        self.drawn = true;

        emit_polygon(&mut self.output, self.scratch.iter().cloned())
    }
}

impl<S: LineSink> LineSink for Stroker<S> {
    fn move_to(&mut self, at: Point) -> SinkResult {
        self.state.move_to(at)?;
        self.finish_open_sub_path()?;
        self.begin_sub_path(at);

        Ok(())
    }

    fn line_join(&mut self) -> SinkResult {
        if self.state.line_join()? {
            self.join_pending = true;
        }

        Ok(())
    }

    fn line_to(&mut self, to: Point) -> SinkResult {
        self.state.line_to(to)?;
        self.edge_to(to);

        Ok(())
    }

    fn close(&mut self) -> SinkResult {
        let (_, start) = self.state.close()?;
        self.edge_to(start);

        self.close_sub_path()
    }

    fn end(&mut self) -> SinkResult {
        if !self.state.end()? {
            return Ok(());
        }

        self.finish_open_sub_path()?;

        self.output.end()
    }

    fn dispose(&mut self) {
        if !self.state.dispose() {
            return;
        }

        log::debug!("stroker disposed");
        self.left = Vec::new();
        self.right = Vec::new();
        self.scratch = Vec::new();
        self.output.dispose();
    }
}

impl<S: LineSink + Reusable> Reusable for Stroker<S> {
    fn reset(&mut self) {
        self.state.reset();
        self.clear_sub_path();
        self.in_sub_path = false;
        self.drawn = false;
        self.output.reset();
    }

    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }
}

/// The direction rotated by a quarter turn.
#[inline]
fn normal(direction: Vector) -> Vector {
    vector(-direction.y, direction.x)
}

#[inline]
fn rotate(v: Vector, angle: f32) -> Vector {
    let (sin, cos) = angle.sin_cos();
    vector(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Approximates the arc starting at `center + from` and sweeping `sweep` radians.
///
/// The start point is not added, the end point is.
fn add_arc(output: &mut Vec<Point>, center: Point, from: Vector, sweep: f32, tolerance: f32) {
    let radius = from.length();
    let max_step = if tolerance < radius {
        2.0 * (1.0 - tolerance / radius).acos()
    } else {
        PI * 0.5
    };
    let count = ((sweep.abs() / max_step).ceil() as u32).max(1);

    for i in 1..=count {
        let angle = sweep * (i as f32 / count as f32);
        output.push(center + rotate(from, angle));
    }
}

/// Connects the offset at `at + normal` to `at - normal` around the end of a segment
/// going in `direction`.
fn add_cap(
    output: &mut Vec<Point>,
    at: Point,
    direction: Vector,
    hw: f32,
    cap: LineCap,
    tolerance: f32,
) {
    let n = normal(direction) * hw;
    match cap {
        LineCap::Butt => {}
        LineCap::Square => {
            let ext = direction * hw;
            output.push(at + n + ext);
            output.push(at - n + ext);
        }
        LineCap::Round => {
            add_arc(output, at, n, -PI, tolerance);
            // The last point of the arc is the first point of the other side.
            output.pop();
        }
    }
}

fn remove_closing_duplicate(points: &mut Vec<Point>) {
    if points.len() > 1 {
        let first = points[0];
        if let Some(last) = points.last() {
            if (*last - first).square_length() < MIN_SEGMENT_LENGTH * MIN_SEGMENT_LENGTH {
                points.pop();
            }
        }
    }
}

fn emit_polygon<S, Points>(output: &mut S, points: Points) -> SinkResult
where
    S: LineSink,
    Points: IntoIterator<Item = Point>,
{
    let mut points = points.into_iter();
    let first = match points.next() {
        Some(p) => p,
        None => return Ok(()),
    };

    output.move_to(first)?;
    for p in points {
        output.line_to(p)?;
    }

    output.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;
    use crate::path::{Command, Recorder, SinkError, Verb};

    fn stroker(options: StrokeOptions) -> Stroker<Recorder> {
        let _ = env_logger::builder().is_test(true).try_init();
        Stroker::new(Recorder::new(), options)
    }

    fn approx(a: Point, b: Point) -> bool {
        (a - b).length() < 1e-3
    }

    fn positions(commands: &[Command]) -> Vec<Point> {
        commands.iter().filter_map(Command::position).collect()
    }

    fn count(commands: &[Command], verb: Verb) -> usize {
        commands.iter().filter(|cmd| cmd.verb() == verb).count()
    }

    #[test]
    fn butt_caps() {
        let mut s = stroker(StrokeOptions::default().with_line_width(2.0));
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(10.0, 0.0)).unwrap();
        s.end().unwrap();

        assert_eq!(
            s.into_inner().commands(),
            &[
                Command::MoveTo(point(0.0, 1.0)),
                Command::LineTo(point(10.0, 1.0)),
                Command::LineTo(point(10.0, -1.0)),
                Command::LineTo(point(0.0, -1.0)),
                Command::Close,
                Command::End,
            ]
        );
    }

    #[test]
    fn square_caps() {
        let options = StrokeOptions::default()
            .with_line_width(2.0)
            .with_line_cap(LineCap::Square);
        let mut s = stroker(options);
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(10.0, 0.0)).unwrap();
        s.end().unwrap();

        assert_eq!(
            s.into_inner().commands(),
            &[
                Command::MoveTo(point(0.0, 1.0)),
                Command::LineTo(point(10.0, 1.0)),
                Command::LineTo(point(11.0, 1.0)),
                Command::LineTo(point(11.0, -1.0)),
                Command::LineTo(point(10.0, -1.0)),
                Command::LineTo(point(0.0, -1.0)),
                Command::LineTo(point(-1.0, -1.0)),
                Command::LineTo(point(-1.0, 1.0)),
                Command::Close,
                Command::End,
            ]
        );
    }

    #[test]
    fn round_caps_stay_within_the_stroke() {
        let options = StrokeOptions::default()
            .with_line_width(4.0)
            .with_line_cap(LineCap::Round)
            .with_tolerance(0.01);
        let mut s = stroker(options);
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(10.0, 0.0)).unwrap();
        s.end().unwrap();

        let output = s.into_inner();
        let points = positions(output.commands());
        assert!(points.len() > 10);
        for p in &points {
            let closest_x = p.x.max(0.0).min(10.0);
            let d = (*p - point(closest_x, 0.0)).length();
            assert!((d - 2.0).abs() < 1e-3, "{:?} is not on the outline", p);
        }
        // The caps reach the ends of the stroke.
        assert!(points.iter().any(|p| approx(*p, point(12.0, 0.0))));
        assert!(points.iter().any(|p| approx(*p, point(-2.0, 0.0))));
    }

    #[test]
    fn closed_sub_path_has_two_contours_and_no_caps() {
        let options = StrokeOptions::default()
            .with_line_width(2.0)
            .with_line_cap(LineCap::Square);
        let mut s = stroker(options);
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(10.0, 0.0)).unwrap();
        s.line_join().unwrap();
        s.line_to(point(10.0, 10.0)).unwrap();
        s.line_join().unwrap();
        s.line_to(point(0.0, 10.0)).unwrap();
        s.line_join().unwrap();
        s.close().unwrap();
        s.end().unwrap();

        let output = s.into_inner();
        let commands = output.commands();
        assert_eq!(count(commands, Verb::MoveTo), 2);
        assert_eq!(count(commands, Verb::Close), 2);
        assert_eq!(count(commands, Verb::End), 1);
        assert_eq!(count(commands, Verb::LineJoin), 0);

        // Miter joins on all four corners of the outer contour.
        let points = positions(commands);
        for corner in &[
            point(-1.0, -1.0),
            point(11.0, -1.0),
            point(11.0, 11.0),
            point(-1.0, 11.0),
        ] {
            assert!(points.iter().any(|p| approx(*p, *corner)), "{:?}", corner);
        }
        // No square caps.
        assert!(points.iter().all(|p| p.x >= -1.001 && p.x <= 11.001));
        assert!(points.iter().all(|p| p.y >= -1.001 && p.y <= 11.001));
    }

    #[test]
    fn joins_require_a_hint() {
        let options = StrokeOptions::default().with_line_width(2.0);

        let mut plain = stroker(options);
        plain.move_to(point(0.0, 0.0)).unwrap();
        plain.line_to(point(10.0, 0.0)).unwrap();
        plain.line_to(point(10.0, 10.0)).unwrap();
        plain.end().unwrap();
        let plain = positions(plain.into_inner().commands());

        let mut hinted = stroker(options);
        hinted.move_to(point(0.0, 0.0)).unwrap();
        hinted.line_to(point(10.0, 0.0)).unwrap();
        hinted.line_join().unwrap();
        hinted.line_to(point(10.0, 10.0)).unwrap();
        hinted.end().unwrap();
        let hinted = positions(hinted.into_inner().commands());

        let miter = point(11.0, -1.0);
        assert!(!plain.iter().any(|p| approx(*p, miter)));
        assert!(hinted.iter().any(|p| approx(*p, miter)));
        assert_eq!(hinted.len(), plain.len() + 1);
    }

    #[test]
    fn miter_limit_falls_back_to_bevel() {
        let options = StrokeOptions::default()
            .with_line_width(2.0)
            .with_miter_limit(2.0);
        let mut s = stroker(options);
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(10.0, 0.0)).unwrap();
        s.line_join().unwrap();
        s.line_to(point(0.0, 1.0)).unwrap();
        s.end().unwrap();

        let points = positions(s.into_inner().commands());
        assert!(points.iter().all(|p| p.x < 11.5));
    }

    #[test]
    fn round_joins() {
        let options = StrokeOptions::default()
            .with_line_width(2.0)
            .with_line_join(LineJoin::Round)
            .with_tolerance(0.01);
        let mut s = stroker(options);
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(10.0, 0.0)).unwrap();
        s.line_join().unwrap();
        s.line_to(point(10.0, 10.0)).unwrap();
        s.end().unwrap();

        let points = positions(s.into_inner().commands());
        // The outer corner is rounded around (10, 0).
        let around_corner: Vec<&Point> = points
            .iter()
            .filter(|p| p.x > 10.01 && p.y < -0.01)
            .collect();
        assert!(around_corner.len() > 2);
        for p in around_corner {
            assert!(((*p - point(10.0, 0.0)).length() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn zero_length_sub_paths() {
        let mut butt = stroker(StrokeOptions::default());
        butt.move_to(point(5.0, 5.0)).unwrap();
        butt.end().unwrap();
        // No outline, so the output never leaves its idle state and `end` is a no-op.
        assert!(butt.into_inner().commands().is_empty());

        let mut round = stroker(
            StrokeOptions::default()
                .with_line_width(2.0)
                .with_line_cap(LineCap::Round),
        );
        round.move_to(point(5.0, 5.0)).unwrap();
        round.line_to(point(5.0, 5.0)).unwrap();
        round.end().unwrap();
        let output = round.into_inner();
        assert_eq!(count(output.commands(), Verb::MoveTo), 1);
        for p in positions(output.commands()) {
            assert!(((p - point(5.0, 5.0)).length() - 1.0).abs() < 1e-3);
        }

        let mut square = stroker(
            StrokeOptions::default()
                .with_line_width(2.0)
                .with_line_cap(LineCap::Square),
        );
        square.move_to(point(5.0, 5.0)).unwrap();
        square.close().unwrap();
        square.end().unwrap();
        assert_eq!(
            square.into_inner().commands(),
            &[
                Command::MoveTo(point(4.0, 4.0)),
                Command::LineTo(point(6.0, 4.0)),
                Command::LineTo(point(6.0, 6.0)),
                Command::LineTo(point(4.0, 6.0)),
                Command::Close,
                Command::End,
            ]
        );
    }

    #[test]
    fn line_to_after_close_starts_a_new_piece() {
        let mut s = stroker(StrokeOptions::default().with_line_width(2.0));
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(10.0, 0.0)).unwrap();
        s.line_to(point(10.0, 10.0)).unwrap();
        s.close().unwrap();
        s.line_to(point(0.0, -10.0)).unwrap();
        s.end().unwrap();

        let output = s.into_inner();
        let commands = output.commands();
        // Two contours for the closed triangle, one for the open piece.
        assert_eq!(count(commands, Verb::MoveTo), 3);
        assert_eq!(count(commands, Verb::Close), 3);
        // The open piece starts at the sub-path start.
        let last_move = commands
            .iter()
            .rev()
            .find_map(|cmd| match cmd {
                Command::MoveTo(p) => Some(*p),
                _ => None,
            })
            .unwrap();
        assert!(approx(last_move, point(1.0, 0.0)));
    }

    #[test]
    fn move_to_finishes_the_previous_sub_path() {
        let mut s = stroker(StrokeOptions::default().with_line_width(2.0));
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(10.0, 0.0)).unwrap();
        s.move_to(point(0.0, 5.0)).unwrap();
        assert_eq!(count(s.output().commands(), Verb::Close), 1);
        s.line_to(point(10.0, 5.0)).unwrap();
        s.end().unwrap();

        let output = s.into_inner();
        assert_eq!(count(output.commands(), Verb::Close), 2);
        assert_eq!(count(output.commands(), Verb::End), 1);
    }

    #[test]
    fn protocol_errors() {
        let mut s = stroker(StrokeOptions::default());
        assert_eq!(
            s.line_to(point(1.0, 0.0)),
            Err(SinkError::IllegalState { verb: Verb::LineTo })
        );
        assert_eq!(
            s.close(),
            Err(SinkError::IllegalState { verb: Verb::Close })
        );
        s.line_join().unwrap();
        s.end().unwrap();
        assert!(s.output().commands().is_empty());

        s.dispose();
        s.dispose();
        assert_eq!(
            s.move_to(point(0.0, 0.0)),
            Err(SinkError::UseAfterDispose { verb: Verb::MoveTo })
        );
        assert_eq!(s.output().commands(), &[Command::Dispose]);
    }

    #[test]
    fn reset_for_reuse() {
        let mut s = stroker(StrokeOptions::default());
        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(3.0, 0.0)).unwrap();
        s.reset();

        assert!(s.output().commands().is_empty());
        s.move_to(point(0.0, 0.0)).unwrap();
        s.end().unwrap();
        assert!(s.output().commands().is_empty());

        s.move_to(point(0.0, 0.0)).unwrap();
        s.line_to(point(0.0, 4.0)).unwrap();
        s.end().unwrap();
        assert_eq!(
            s.output().commands(),
            &[
                Command::MoveTo(point(-0.5, 0.0)),
                Command::LineTo(point(-0.5, 4.0)),
                Command::LineTo(point(0.5, 4.0)),
                Command::LineTo(point(0.5, 0.0)),
                Command::Close,
                Command::End,
            ]
        );
    }
}
