//! Replay controls for a recorded trace.
//!
//! The controller is a plain state machine. Auto-play is expressed as a
//! single [`PendingTick`] owned by the controller: every transition replaces
//! it with a fresh id, so a tick that fires after being superseded is
//! recognised as stale and ignored. [`crate::AutoPlay`] turns the pending
//! tick into a real timer.

use std::sync::Arc;
use std::time::Duration;

use arbor_trace::{Step, Trace};
use arbor_tree::{build_level_order, Tree};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Default delay between auto-play steps.
pub const DEFAULT_SPEED: Duration = Duration::from_millis(1000);

/// Shortest accepted delay between auto-play steps.
pub const MIN_SPEED: Duration = Duration::from_millis(1);

/// Preset playback speeds offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSpeed {
    /// 0.5x speed
    Half,
    /// Normal speed (1x)
    Normal,
    /// 2x speed
    Double,
    /// 4x speed
    Quadruple,
}

impl PlaybackSpeed {
    /// All presets, slowest first.
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Double,
        PlaybackSpeed::Quadruple,
    ];

    /// Get the speed multiplier.
    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
        }
    }

    /// Delay between steps at this speed.
    pub fn delay(&self) -> Duration {
        DEFAULT_SPEED.div_f64(self.multiplier())
    }
}

impl From<PlaybackSpeed> for Duration {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.delay()
    }
}

/// Identifier of a scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickId(pub u64);

/// What a tick does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickAction {
    /// Move forward one step
    Advance,
    /// Clear the playing flag after reaching the last step
    Stop,
}

/// The single outstanding auto-play action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTick {
    pub id: TickId,
    pub action: TickAction,
    pub delay: Duration,
}

/// A user command, as received from a control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayCommand {
    Toggle,
    Next,
    Prev,
    /// Out-of-range indices (negative included) are clamped.
    Jump { index: i64 },
    /// Delays below [`MIN_SPEED`] are raised to it.
    Speed { millis: u64 },
    Preset { speed: PlaybackSpeed },
}

/// Replay controller over the trace of the current input.
pub struct Replay {
    input: Vec<Option<i32>>,
    tree: Tree,
    trace: Arc<Trace>,
    position: usize,
    is_playing: bool,
    speed: Duration,
    pending: Option<PendingTick>,
    next_tick: u64,
}

impl Replay {
    /// Create a controller for a level-order input.
    pub fn new(input: Vec<Option<i32>>, speed: Duration) -> Self {
        let tree = build_level_order(&input);
        let trace = Arc::new(Trace::record(&tree));
        Self {
            input,
            tree,
            trace,
            position: 0,
            is_playing: false,
            speed: speed.max(MIN_SPEED),
            pending: None,
            next_tick: 0,
        }
    }

    /// Get the current step index.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Get the delay between auto-play steps.
    pub fn speed(&self) -> Duration {
        self.speed
    }

    /// Get the total number of steps.
    pub fn total_steps(&self) -> usize {
        self.trace.len()
    }

    pub fn last_index(&self) -> usize {
        self.trace.last_index()
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.last_index()
    }

    pub fn input(&self) -> &[Option<i32>] {
        &self.input
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn trace(&self) -> &Arc<Trace> {
        &self.trace
    }

    /// Get the step at the current position.
    pub fn current_step(&self) -> Option<&Step> {
        self.trace.get(self.position)
    }

    /// The auto-play action waiting to fire, if any.
    pub fn pending(&self) -> Option<PendingTick> {
        self.pending
    }

    /// Step forward one step. Cancels auto-play.
    pub fn step_forward(&mut self) {
        self.position = (self.position + 1).min(self.last_index());
        self.is_playing = false;
        trace!(position = self.position, "step forward");
        self.reschedule();
    }

    /// Step backward one step. Cancels auto-play.
    pub fn step_backward(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.is_playing = false;
        trace!(position = self.position, "step backward");
        self.reschedule();
    }

    /// Jump to a specific step, clamped to the trace. Cancels auto-play.
    pub fn jump_to(&mut self, index: usize) {
        self.position = index.min(self.last_index());
        self.is_playing = false;
        trace!(requested = index, position = self.position, "jump");
        self.reschedule();
    }

    /// Change the auto-play delay, no shorter than [`MIN_SPEED`]. A pending
    /// advance restarts with it.
    pub fn set_speed(&mut self, speed: Duration) {
        self.speed = speed.max(MIN_SPEED);
        debug!(speed_ms = self.speed.as_millis() as u64, "speed changed");
        self.reschedule();
    }

    /// Start or pause auto-play. At the last step, restart from the beginning.
    pub fn toggle_play(&mut self) {
        if self.is_at_end() {
            self.position = 0;
            self.is_playing = true;
        } else {
            self.is_playing = !self.is_playing;
        }
        debug!(playing = self.is_playing, position = self.position, "toggle play");
        self.reschedule();
    }

    /// Replace the input. Rebuilds the trace and rewinds only when the new
    /// input differs from the current one; returns whether it did.
    pub fn data_changed(&mut self, input: &[Option<i32>]) -> bool {
        if self.input == input {
            trace!("input unchanged");
            return false;
        }

        self.input = input.to_vec();
        self.tree = build_level_order(&self.input);
        self.trace = Arc::new(Trace::record(&self.tree));
        self.position = 0;
        self.is_playing = false;
        debug!(
            nodes = self.tree.len(),
            steps = self.trace.len(),
            "input replaced"
        );
        self.reschedule();
        true
    }

    /// Fire a scheduled tick. Returns false if `id` is no longer pending.
    pub fn on_tick(&mut self, id: TickId) -> bool {
        let Some(tick) = self.pending.filter(|tick| tick.id == id) else {
            trace!(tick = id.0, "stale tick ignored");
            return false;
        };

        match tick.action {
            TickAction::Advance => {
                self.position = (self.position + 1).min(self.last_index());
            }
            TickAction::Stop => {
                self.is_playing = false;
            }
        }
        trace!(tick = id.0, action = ?tick.action, position = self.position, "tick");
        self.reschedule();
        true
    }

    /// Apply a user command.
    pub fn apply(&mut self, command: ReplayCommand) {
        match command {
            ReplayCommand::Toggle => self.toggle_play(),
            ReplayCommand::Next => self.step_forward(),
            ReplayCommand::Prev => self.step_backward(),
            ReplayCommand::Jump { index } => {
                self.jump_to(usize::try_from(index.max(0)).unwrap_or(usize::MAX))
            }
            ReplayCommand::Speed { millis } => self.set_speed(Duration::from_millis(millis)),
            ReplayCommand::Preset { speed } => self.set_speed(speed.into()),
        }
    }

    /// Get a status summary for control widgets.
    pub fn status(&self) -> ReplayStatus {
        ReplayStatus::from(self)
    }

    /// Replace the pending tick to match the current state.
    fn reschedule(&mut self) {
        let action = match (self.is_playing, self.is_at_end()) {
            (false, _) => None,
            (true, false) => Some((TickAction::Advance, self.speed)),
            (true, true) => Some((TickAction::Stop, Duration::ZERO)),
        };

        self.pending = action.map(|(action, delay)| {
            let id = TickId(self.next_tick);
            self.next_tick += 1;
            PendingTick { id, action, delay }
        });
    }
}

/// Replay status for sending to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayStatus {
    pub position: usize,
    pub total_steps: usize,
    pub is_playing: bool,
    pub speed_ms: u64,
    pub progress: f64,
    pub at_end: bool,
}

impl From<&Replay> for ReplayStatus {
    fn from(replay: &Replay) -> Self {
        let last = replay.last_index();
        Self {
            position: replay.position,
            total_steps: replay.total_steps(),
            is_playing: replay.is_playing,
            speed_ms: replay.speed.as_millis() as u64,
            progress: if last == 0 {
                0.0
            } else {
                replay.position as f64 / last as f64
            },
            at_end: replay.is_at_end(),
        }
    }
}
