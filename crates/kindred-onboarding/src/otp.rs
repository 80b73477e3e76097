//! OTP entry with its resend countdown.
//!
//! The countdown ticks once per second on the session's own timer queue.
//! Resending is only allowed once it reached zero, and restarts it.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use kindred_shared::constants::{OTP_LENGTH, OTP_RESEND_SECS};
use kindred_shared::timers::{TimerId, TimerQueue};
use kindred_shared::ValidationError;

use crate::input::validate_otp;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CountdownTick;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OtpView {
    pub phone_number: String,
    pub digits: Vec<Option<char>>,
    pub seconds_left: u32,
    pub can_resend: bool,
}

#[derive(Debug)]
pub struct OtpSession {
    phone_number: String,
    digits: [Option<char>; OTP_LENGTH],
    resend_secs: u32,
    seconds_left: u32,
    tick: Option<TimerId>,
    timers: TimerQueue<CountdownTick>,
}

impl OtpSession {
    /// Start the countdown for a code just sent to `phone_number`.
    pub fn start(phone_number: impl Into<String>) -> Self {
        Self::with_resend_secs(phone_number, OTP_RESEND_SECS)
    }

    pub fn with_resend_secs(phone_number: impl Into<String>, resend_secs: u32) -> Self {
        let mut session = Self {
            phone_number: phone_number.into(),
            digits: [None; OTP_LENGTH],
            resend_secs,
            seconds_left: resend_secs,
            tick: None,
            timers: TimerQueue::new(),
        };
        session.schedule_tick();
        session
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn can_resend(&self) -> bool {
        self.seconds_left == 0
    }

    /// Put a digit into box `index`. Returns the box that should get focus
    /// next, if any.
    pub fn enter_digit(&mut self, index: usize, digit: char) -> Result<Option<usize>, ValidationError> {
        if index >= OTP_LENGTH {
            return Err(ValidationError::SlotOutOfRange(index));
        }
        if !digit.is_ascii_digit() {
            return Err(ValidationError::IncompleteOtp);
        }
        self.digits[index] = Some(digit);
        Ok((index + 1 < OTP_LENGTH).then_some(index + 1))
    }

    /// Backspace on box `index`. Clears it, or moves focus back when it was
    /// already empty.
    pub fn backspace(&mut self, index: usize) -> Option<usize> {
        let slot = self.digits.get_mut(index)?;
        if slot.take().is_some() {
            Some(index)
        } else {
            index.checked_sub(1)
        }
    }

    /// Paste a whole code; non-digits are ignored.
    pub fn set_code(&mut self, code: &str) {
        self.digits = [None; OTP_LENGTH];
        for (slot, c) in self
            .digits
            .iter_mut()
            .zip(code.chars().filter(|c| c.is_ascii_digit()))
        {
            *slot = Some(c);
        }
    }

    pub fn code(&self) -> String {
        self.digits.iter().flatten().collect()
    }

    /// The entered code if it is complete.
    pub fn complete_code(&self) -> Result<String, ValidationError> {
        let code = self.code();
        validate_otp(&code)?;
        Ok(code)
    }

    /// Restart the countdown and clear the entered code. Returns `false`
    /// while the countdown is still running.
    pub fn resend(&mut self) -> bool {
        if !self.can_resend() {
            debug!(seconds_left = self.seconds_left, "Resend requested too early");
            return false;
        }
        self.digits = [None; OTP_LENGTH];
        self.seconds_left = self.resend_secs;
        self.schedule_tick();
        info!(phone = %self.phone_number, "OTP resent");
        true
    }

    /// Advance the countdown clock.
    pub fn advance(&mut self, by: Duration) {
        let target = self.timers.now() + by;
        while self.timers.pop_due(target).is_some() {
            self.tick = None;
            self.seconds_left = self.seconds_left.saturating_sub(1);
            if self.seconds_left > 0 {
                self.schedule_tick();
            }
        }
        self.timers.set_now(target);
    }

    /// Time until the countdown next changes.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    /// Stop the countdown; used when the screen goes away.
    pub fn close(&mut self) {
        self.timers.cancel_all();
        self.tick = None;
    }

    pub fn view(&self) -> OtpView {
        OtpView {
            phone_number: self.phone_number.clone(),
            digits: self.digits.to_vec(),
            seconds_left: self.seconds_left,
            can_resend: self.can_resend(),
        }
    }

    fn schedule_tick(&mut self) {
        if let Some(old) = self.tick.take() {
            self.timers.cancel(old);
        }
        if self.seconds_left > 0 {
            self.tick = Some(self.timers.schedule(COUNTDOWN_TICK, CountdownTick));
        }
    }
}
