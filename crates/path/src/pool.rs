//! Reuse of sinks across paths.
//!
//! Sinks such as the renderer own buffers that are worth keeping from one frame to the
//! next. A [`SinkPool`](struct.SinkPool.html) hands them out wrapped in a
//! [`PooledSink`](struct.PooledSink.html) guard. When the guard goes out of scope, on any
//! exit path, the sink is reset to its idle state and made available again, unless it was
//! disposed in the meantime in which case it is dropped.
//!
//! # Examples
//!
//! ```
//! use linework_path::{LineSink, Recorder, SinkPool};
//! use linework_path::math::point;
//!
//! let pool = SinkPool::new(Recorder::new);
//!
//! {
//!     let mut sink = pool.acquire();
//!     sink.move_to(point(0.0, 0.0)).unwrap();
//!     sink.line_to(point(1.0, 0.0)).unwrap();
//!     sink.end().unwrap();
//!     assert_eq!(sink.segments().len(), 1);
//! }
//!
//! // The recorder went back to the pool, cleared.
//! assert_eq!(pool.idle_count(), 1);
//! assert!(pool.acquire().commands().is_empty());
//! ```

use crate::error::SinkResult;
use crate::math::Point;
use crate::sink::{LineSink, Reusable};

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// A pool of reusable sinks.
///
/// The pool can be shared between threads, but each sink it hands out is only ever
/// driven by the holder of its guard.
pub struct SinkPool<S> {
    idle: Mutex<Vec<S>>,
    factory: Box<dyn Fn() -> S + Send + Sync>,
}

impl<S: LineSink + Reusable> SinkPool<S> {
    /// Creates an empty pool that builds new sinks with `factory` when it runs out.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        SinkPool {
            idle: Mutex::new(Vec::new()),
            factory: Box::new(factory),
        }
    }

    /// Takes an idle sink out of the pool, or creates one.
    pub fn acquire(&self) -> PooledSink<'_, S> {
        let recycled = self.idle().pop();
        let sink = match recycled {
            Some(sink) => {
                log::debug!("reusing a pooled sink");
                sink
            }
            None => {
                log::debug!("allocating a new pooled sink");
                (self.factory)()
            }
        };

        PooledSink {
            sink: ManuallyDrop::new(sink),
            pool: self,
        }
    }

    /// Number of sinks waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle().len()
    }

    /// Drops all idle sinks.
    pub fn clear(&self) {
        self.idle().clear();
    }

    fn release(&self, mut sink: S) {
        if sink.is_disposed() {
            log::debug!("dropping a disposed sink instead of returning it to the pool");
            return;
        }

        sink.reset();
        self.idle().push(sink);
    }

    fn idle(&self) -> MutexGuard<'_, Vec<S>> {
        // Sinks are reset before they are put back, so the list stays usable
        // even if a holder panicked while the lock was taken.
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A sink checked out of a [`SinkPool`](struct.SinkPool.html).
///
/// Dereferences to the sink and also implements `LineSink` itself so that it can be
/// handed to producers directly.
pub struct PooledSink<'l, S: LineSink + Reusable> {
    sink: ManuallyDrop<S>,
    pool: &'l SinkPool<S>,
}

impl<'l, S: LineSink + Reusable> Deref for PooledSink<'l, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.sink
    }
}

impl<'l, S: LineSink + Reusable> DerefMut for PooledSink<'l, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<'l, S: LineSink + Reusable> Drop for PooledSink<'l, S> {
    fn drop(&mut self) {
        // SAFETY: the sink is taken exactly once, here, and the guard is not
        // accessible afterwards.
        let sink = unsafe { ManuallyDrop::take(&mut self.sink) };
        self.pool.release(sink);
    }
}

impl<'l, S: LineSink + Reusable> LineSink for PooledSink<'l, S> {
    fn move_to(&mut self, at: Point) -> SinkResult {
        self.sink.move_to(at)
    }

    fn line_join(&mut self) -> SinkResult {
        self.sink.line_join()
    }

    fn line_to(&mut self, to: Point) -> SinkResult {
        self.sink.line_to(to)
    }

    fn close(&mut self) -> SinkResult {
        self.sink.close()
    }

    fn end(&mut self) -> SinkResult {
        self.sink.end()
    }

    fn dispose(&mut self) {
        self.sink.dispose()
    }
}

#[cfg(test)]
use crate::math::point;
#[cfg(test)]
use crate::Recorder;

#[test]
fn sinks_are_reset_on_release() {
    crate::init_logger();

    let pool = SinkPool::new(Recorder::new);

    {
        let mut sink = pool.acquire();
        sink.move_to(point(0.0, 0.0)).unwrap();
        sink.line_to(point(1.0, 1.0)).unwrap();
        // Dropped mid-path.
    }

    assert_eq!(pool.idle_count(), 1);
    let mut sink = pool.acquire();
    assert!(sink.state().is_idle());
    assert!(sink.commands().is_empty());
    assert!(sink.line_to(point(2.0, 2.0)).is_err());
}

#[test]
fn sinks_are_released_on_error_paths() {
    crate::init_logger();

    fn draw(sink: &mut dyn LineSink) -> SinkResult {
        sink.move_to(point(0.0, 0.0))?;
        sink.end()?;
        sink.close()?;
        sink.line_to(point(1.0, 1.0))
    }

    let pool = SinkPool::new(Recorder::new);
    let result = {
        let mut sink = pool.acquire();
        draw(&mut *sink)
    };

    assert!(result.is_err());
    assert_eq!(pool.idle_count(), 1);
}

#[test]
fn double_dispose_does_not_affect_other_sinks() {
    crate::init_logger();

    let pool = SinkPool::new(Recorder::new);

    let mut a = pool.acquire();
    let mut b = pool.acquire();

    b.move_to(point(0.0, 0.0)).unwrap();
    a.dispose();
    a.dispose();
    b.line_to(point(1.0, 0.0)).unwrap();
    b.end().unwrap();

    assert!(a.is_disposed());
    assert!(!b.is_disposed());
    assert_eq!(b.segments().len(), 1);

    drop(a);
    drop(b);

    // Only the sink that was not disposed is returned to the pool.
    assert_eq!(pool.idle_count(), 1);
    assert!(!pool.acquire().is_disposed());
}
