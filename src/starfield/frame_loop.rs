//! Start/stop handle for the per-frame animation loop.
//!
//! Hosts call [`FrameLoop::tick`] from their refresh callback
//! (`requestAnimationFrame` in a browser, a fixed timestep offline). Ticks
//! are dropped unless the loop is running, so a host page can tear the
//! effect down deterministically with [`FrameLoop::stop`].

use crate::starfield::{Connection, Starfield};
use crate::surface::Surface;

/// Lifecycle of a frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Created, never started
    #[default]
    Idle,
    Running,
    Stopped,
}

/// A starfield bound to a lifecycle.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    field: Starfield,
    state: LoopState,
    frames: u64,
}

impl FrameLoop {
    pub fn new(field: Starfield) -> Self {
        Self { field, state: LoopState::Idle, frames: 0 }
    }

    /// Begin (or resume) accepting ticks. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.state == LoopState::Running {
            return false;
        }
        self.state = LoopState::Running;
        log::debug!("starfield loop started after {} frames", self.frames);
        true
    }

    /// Stop accepting ticks. Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.state = LoopState::Stopped;
        log::debug!("starfield loop stopped after {} frames", self.frames);
        true
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn field(&self) -> &Starfield {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Starfield {
        &mut self.field
    }

    /// Run one frame if the loop is running.
    ///
    /// Returns the frame's connections, or `None` when the tick was ignored.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S, time_ms: f64) -> Option<Vec<Connection>> {
        if !self.is_running() {
            return None;
        }
        self.frames += 1;
        Some(self.field.frame(surface, time_ms))
    }
}
