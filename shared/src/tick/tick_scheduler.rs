use std::time::Duration;

use log::{debug, error};

use crate::{
    tick::tick_config::{PhysicsMode, TickConfig},
    types::Tick,
};

/// One step of the fixed-rate loop. Every tick fires `PreTick`, `Tick`,
/// `PhysicsStep` (when physics is stepped) and `PostTick`, in that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickPhase {
    /// Fired before the tick counter moves to the carried value
    PreTick(Tick),
    Tick(Tick),
    /// Fixed physics delta, equal to the tick delta
    PhysicsStep(Duration),
    PostTick(Tick),
}

/// How fractional tick counts are rounded by [`TickScheduler::time_to_ticks`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TickRounding {
    #[default]
    Nearest,
    Down,
    Up,
}

/// Fixed-rate simulation clock, fed with frame durations by its owner
pub struct TickScheduler {
    tick_delta: Option<Duration>,
    physics_mode: PhysicsMode,
    tick: Tick,
    accumulated: Duration,
    active: bool,
}

impl TickScheduler {
    pub fn new(config: &TickConfig) -> Self {
        let tick_delta = match config.validate() {
            Ok(()) => config.tick_delta(),
            Err(err) => {
                error!("{}", err);
                None
            }
        };

        Self {
            tick_delta,
            physics_mode: config.physics_mode,
            tick: 0,
            accumulated: Duration::ZERO,
            active: false,
        }
    }

    /// Starts or stops the clock. While stopped the accumulator is frozen and
    /// elapsed time passed to [`advance`](Self::advance) is discarded.
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            debug!("tick scheduler {}", if active { "started" } else { "stopped" });
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// False if the configured rate was invalid. A disabled scheduler never ticks.
    pub fn is_enabled(&self) -> bool {
        self.tick_delta.is_some()
    }

    /// The most recently fired tick
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn tick_delta(&self) -> Option<Duration> {
        self.tick_delta
    }

    /// Time carried over towards the next tick
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Adds `elapsed` to the accumulator and fires every tick that is due,
    /// calling `on_phase` for each phase. Returns the number of ticks fired.
    pub fn advance<F: FnMut(TickPhase)>(&mut self, elapsed: Duration, mut on_phase: F) -> u32 {
        if !self.active {
            return 0;
        }
        let Some(tick_delta) = self.tick_delta else {
            return 0;
        };

        self.accumulated += elapsed;

        let mut fired = 0;
        while self.accumulated >= tick_delta {
            let next_tick = self.tick.wrapping_add(1);

            on_phase(TickPhase::PreTick(next_tick));
            self.tick = next_tick;
            on_phase(TickPhase::Tick(next_tick));
            if self.physics_mode == PhysicsMode::Stepped {
                on_phase(TickPhase::PhysicsStep(tick_delta));
            }
            on_phase(TickPhase::PostTick(next_tick));

            self.accumulated -= tick_delta;
            fired += 1;
        }

        fired
    }

    /// Converts a duration to a tick count
    pub fn time_to_ticks(&self, duration: Duration, rounding: TickRounding) -> u32 {
        let Some(tick_delta) = self.tick_delta else {
            return 0;
        };

        let numerator = duration.as_nanos();
        let denominator = tick_delta.as_nanos();
        let ticks = match rounding {
            TickRounding::Down => numerator / denominator,
            TickRounding::Up => numerator.div_ceil(denominator),
            TickRounding::Nearest => (numerator + denominator / 2) / denominator,
        };

        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    pub fn ticks_to_time(&self, ticks: u32) -> Duration {
        match self.tick_delta {
            Some(tick_delta) => tick_delta * ticks,
            None => Duration::ZERO,
        }
    }

    /// Simulated time between `since` and the current tick. The tick counter
    /// wraps, so `since` is taken to be at most one full wrap behind.
    pub fn time_passed(&self, since: Tick) -> Duration {
        self.ticks_to_time(self.tick.wrapping_sub(since))
    }
}
