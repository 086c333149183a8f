//! Hierarchical progress reporting
//!
//! A [`ProgressTracker`] holds a job-scoped stack of progress levels. Each
//! level declares a known step count; levels nest arbitrarily deep to
//! mirror the recursive plan builder and the two-step brackets used by the
//! executor. [`ProgressTracker::push_level`] returns a scope guard that
//! pops the level when dropped, so every exit path (including failure
//! paths) stays balanced.
//!
//! The tracker is cheaply cloneable and shares its stack: a job invoked as
//! a sub-operation of another job reuses the parent's tracker, and its
//! levels nest into the parent's stack instead of starting a fresh one.

use std::sync::{Arc, Mutex};
use tracing::warn;

/// Observer notified of progress transitions.
///
/// Hosts can bridge this to a terminal progress bar; tests use it to check
/// push/pop balance.
pub trait ProgressListener: Send + Sync {
    /// A new level with the given step count was opened
    fn level_pushed(&self, _total_steps: usize, _depth: usize) {}

    /// The current level advanced by one step
    fn stepped(&self, _done: usize, _total_steps: usize, _depth: usize) {}

    /// The current level was closed
    fn level_popped(&self, _depth: usize) {}
}

#[derive(Debug)]
struct Level {
    total: usize,
    done: usize,
}

/// Job-scoped stack of progress levels
#[derive(Clone, Default)]
pub struct ProgressTracker {
    levels: Arc<Mutex<Vec<Level>>>,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl ProgressTracker {
    /// Create a tracker with no listener
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker reporting transitions to the given listener
    pub fn with_listener(listener: Arc<dyn ProgressListener>) -> Self {
        Self {
            levels: Arc::default(),
            listener: Some(listener),
        }
    }

    /// Open a nested level with a known step count. The returned scope pops
    /// the level when dropped.
    pub fn push_level(&self, total_steps: usize) -> ProgressScope {
        let depth = {
            let mut levels = self.levels.lock().expect("progress lock poisoned");
            levels.push(Level {
                total: total_steps,
                done: 0,
            });
            levels.len()
        };
        if let Some(listener) = &self.listener {
            listener.level_pushed(total_steps, depth);
        }
        ProgressScope {
            tracker: self.clone(),
        }
    }

    /// Advance the current level by one step
    pub fn step(&self) {
        let notified = {
            let mut levels = self.levels.lock().expect("progress lock poisoned");
            match levels.last_mut() {
                Some(level) if level.done < level.total => {
                    level.done += 1;
                    Some((level.done, level.total, levels.len()))
                }
                Some(level) => {
                    warn!(total = level.total, "progress step past declared level size");
                    None
                }
                None => {
                    warn!("progress step with no open level");
                    None
                }
            }
        };
        if let Some((done, total, depth)) = notified {
            if let Some(listener) = &self.listener {
                listener.stepped(done, total, depth);
            }
        }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.levels.lock().expect("progress lock poisoned").len()
    }

    /// Overall completion in `[0, 1]`, folding nested levels into their
    /// parent's current step
    pub fn fraction(&self) -> f64 {
        let levels = self.levels.lock().expect("progress lock poisoned");
        let mut fraction = 0.0;
        let mut scale = 1.0;
        for level in levels.iter() {
            if level.total == 0 {
                break;
            }
            fraction += scale * (level.done as f64 / level.total as f64);
            scale /= level.total as f64;
        }
        fraction.min(1.0)
    }

    fn pop_level(&self) {
        let depth = {
            let mut levels = self.levels.lock().expect("progress lock poisoned");
            if levels.pop().is_none() {
                warn!("progress pop with no open level");
                return;
            }
            levels.len() + 1
        };
        if let Some(listener) = &self.listener {
            listener.level_popped(depth);
        }
    }
}

/// Scope guard closing a progress level on drop
pub struct ProgressScope {
    tracker: ProgressTracker,
}

impl ProgressScope {
    /// Advance the level this scope opened by one step
    pub fn step(&self) {
        self.tracker.step();
    }
}

impl Drop for ProgressScope {
    fn drop(&mut self) {
        self.tracker.pop_level();
    }
}
