//! Face verification progress.
//!
//! Progress climbs from 0 to 100 one point per tick, then settles briefly
//! before the run reports completion. Progress reported by a real
//! verification collaborator can be fed in with [`FaceVerification::report`].

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use kindred_shared::constants::{FACE_VERIFICATION_SETTLE, FACE_VERIFICATION_TICK};
use kindred_shared::timers::TimerQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerificationTimer {
    Tick,
    Settled,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VerificationState {
    Idle,
    Scanning,
    Settling,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationEvent {
    Progress(u8),
    Completed,
}

#[derive(Debug)]
pub struct FaceVerification {
    progress: u8,
    state: VerificationState,
    simulated: bool,
    timers: TimerQueue<VerificationTimer>,
}

impl FaceVerification {
    /// A run driven by its own ticks.
    pub fn simulated() -> Self {
        Self {
            progress: 0,
            state: VerificationState::Idle,
            simulated: true,
            timers: TimerQueue::new(),
        }
    }

    /// A run driven by externally reported progress.
    pub fn external() -> Self {
        Self {
            simulated: false,
            ..Self::simulated()
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn state(&self) -> VerificationState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == VerificationState::Completed
    }

    pub fn start(&mut self) {
        if self.state != VerificationState::Idle {
            return;
        }
        self.state = VerificationState::Scanning;
        if self.simulated {
            self.timers.schedule(FACE_VERIFICATION_TICK, VerificationTimer::Tick);
        }
        info!("Face verification started");
    }

    /// Record externally reported progress. Values never go backwards.
    pub fn report(&mut self, progress: u8) -> Vec<VerificationEvent> {
        if self.state != VerificationState::Scanning {
            return Vec::new();
        }
        let progress = progress.min(100);
        if progress <= self.progress {
            return Vec::new();
        }
        self.progress = progress;
        let mut events = vec![VerificationEvent::Progress(progress)];
        if progress == 100 {
            self.begin_settle();
        }
        events.extend(self.advance(Duration::ZERO));
        events
    }

    pub fn advance(&mut self, by: Duration) -> Vec<VerificationEvent> {
        let target = self.timers.now() + by;
        let mut events = Vec::new();
        while let Some(timer) = self.timers.pop_due(target) {
            match timer {
                VerificationTimer::Tick => {
                    self.progress = (self.progress + 1).min(100);
                    events.push(VerificationEvent::Progress(self.progress));
                    if self.progress == 100 {
                        self.begin_settle();
                    } else {
                        self.timers
                            .schedule(FACE_VERIFICATION_TICK, VerificationTimer::Tick);
                    }
                }
                VerificationTimer::Settled => {
                    self.state = VerificationState::Completed;
                    info!("Face verification completed");
                    events.push(VerificationEvent::Completed);
                }
            }
        }
        self.timers.set_now(target);
        events
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    /// Stop the run; pending ticks are dropped.
    pub fn cancel(&mut self) {
        let dropped = self.timers.cancel_all();
        if self.state != VerificationState::Completed {
            self.state = VerificationState::Canceled;
        }
        debug!(dropped, "Face verification canceled");
    }

    /// Status line shown under the progress bar.
    pub fn status_message(&self) -> &'static str {
        match self.progress {
            0..=29 => "Hang tight! Almost there...",
            30..=59 => "Processing your verification...",
            60..=89 => "Almost complete...",
            _ => "Verification successful!",
        }
    }

    fn begin_settle(&mut self) {
        self.state = VerificationState::Settling;
        self.timers
            .schedule(FACE_VERIFICATION_SETTLE, VerificationTimer::Settled);
    }
}
