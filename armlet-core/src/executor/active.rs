//! Trajectory in flight

use crate::motion::{JointAngles, Trajectory};

/// A planned trajectory being written out one sample per tick
#[derive(Debug, Clone)]
pub struct ActiveMove {
    trajectory: Trajectory,
    started_ms: u64,
    next: usize,
    last_written: Option<JointAngles>,
}

impl ActiveMove {
    pub fn new(trajectory: Trajectory, started_ms: u64) -> Self {
        Self {
            trajectory,
            started_ms,
            next: 0,
            last_written: None,
        }
    }

    /// Next sample if its time has come
    ///
    /// Hands out at most one sample per call, so a late tick never
    /// bursts through several samples at once.
    pub fn step(&mut self, now_ms: u64) -> Option<JointAngles> {
        let sample = *self.trajectory.sample(self.next)?;
        let due = self.started_ms + u64::from(self.trajectory.sample_time_ms(self.next));
        if now_ms < due {
            return None;
        }

        self.next += 1;
        self.last_written = Some(sample);
        Some(sample)
    }

    /// True once every sample has been handed out
    pub fn is_finished(&self) -> bool {
        self.next >= self.trajectory.len()
    }

    /// Most recent sample handed out
    pub fn last_written(&self) -> Option<JointAngles> {
        self.last_written
    }

    /// Samples not yet handed out
    pub fn remaining(&self) -> usize {
        self.trajectory.len().saturating_sub(self.next)
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }
}
