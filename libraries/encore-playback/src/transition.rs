//! Track transition policy
//!
//! Decides what happens when a track ends (repeat, interstitial, advance) and
//! owns the interstitial auto-close timer.
//!
//! The timer is virtual: the engine advances it from `tick`, or a host with
//! real timers reports expiry through the token announced when it was armed.
//! Arming always replaces the previous timer, and every arm hands out a new
//! token, so a late expiry for an old token is a no-op.

use crate::random::RandomSource;
use crate::types::TimerToken;
use std::time::Duration;

/// What to do after the current track ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEndAction {
    /// Repeat is on: restart the same track
    Restart,
    /// Show the ad at this catalog index, then advance when it closes
    ShowAd {
        /// Index into the ad catalog
        ad_index: usize,
    },
    /// Go straight to the next track
    Advance,
}

/// A timer that has fired or was taken by token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiredTimer {
    /// Token the timer was armed with
    pub token: TimerToken,
    /// Whether the queue should advance after closing the ad
    pub advance: bool,
}

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    token: TimerToken,
    remaining: Duration,
    advance: bool,
}

/// Single-slot cancellable one-shot timer
#[derive(Debug, Clone, Default)]
pub struct AdTimer {
    last_token: u64,
    armed: Option<ArmedTimer>,
}

impl AdTimer {
    /// Create an idle timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for `delay`, replacing any armed timer
    pub fn arm(&mut self, delay: Duration, advance: bool) -> TimerToken {
        self.last_token += 1;
        let token = TimerToken(self.last_token);
        self.armed = Some(ArmedTimer {
            token,
            remaining: delay,
            advance,
        });
        token
    }

    /// Disarm; returns whether a timer was armed
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    /// Advance virtual time; returns the timer if it expired
    pub fn tick(&mut self, elapsed: Duration) -> Option<ExpiredTimer> {
        let armed = self.armed.as_mut()?;
        armed.remaining = armed.remaining.saturating_sub(elapsed);
        if armed.remaining.is_zero() {
            self.armed.take().map(|t| ExpiredTimer {
                token: t.token,
                advance: t.advance,
            })
        } else {
            None
        }
    }

    /// Fire the armed timer if `token` is current
    pub fn expire(&mut self, token: TimerToken) -> Option<ExpiredTimer> {
        match self.armed {
            Some(armed) if armed.token == token => {
                self.armed = None;
                Some(ExpiredTimer {
                    token,
                    advance: armed.advance,
                })
            }
            _ => None,
        }
    }

    /// Token of the armed timer
    pub fn armed_token(&self) -> Option<TimerToken> {
        self.armed.map(|t| t.token)
    }

    /// Time left on the armed timer
    pub fn remaining(&self) -> Option<Duration> {
        self.armed.map(|t| t.remaining)
    }
}

/// End-of-track policy plus interstitial timer
#[derive(Debug, Clone)]
pub struct TransitionController {
    ad_probability: f64,
    ad_duration: Duration,
    timer: AdTimer,
}

impl TransitionController {
    /// Create a controller
    ///
    /// # Arguments
    /// * `ad_probability` - chance of an interstitial per natural track end
    /// * `ad_duration` - delay before an interstitial closes itself
    pub fn new(ad_probability: f64, ad_duration: Duration) -> Self {
        Self {
            ad_probability,
            ad_duration,
            timer: AdTimer::new(),
        }
    }

    /// Decide the action for a natural track end
    ///
    /// Draws one uniform sample unless repeat is on; a second draw picks
    /// the ad when one is shown.
    pub fn on_track_end(
        &self,
        repeating: bool,
        ad_count: usize,
        rng: &mut dyn RandomSource,
    ) -> TrackEndAction {
        if repeating {
            return TrackEndAction::Restart;
        }

        let draw = rng.next_f64();
        if draw < self.ad_probability && ad_count > 0 {
            TrackEndAction::ShowAd {
                ad_index: rng.index_below(ad_count),
            }
        } else {
            TrackEndAction::Advance
        }
    }

    /// Arm the auto-close timer for a freshly shown ad
    pub fn arm_auto_close(&mut self, advance: bool) -> TimerToken {
        self.timer.arm(self.ad_duration, advance)
    }

    /// Cancel the auto-close timer
    pub fn cancel_auto_close(&mut self) -> bool {
        self.timer.cancel()
    }

    /// Advance virtual time
    pub fn tick(&mut self, elapsed: Duration) -> Option<ExpiredTimer> {
        self.timer.tick(elapsed)
    }

    /// Fire by token (host-driven timers)
    pub fn expire(&mut self, token: TimerToken) -> Option<ExpiredTimer> {
        self.timer.expire(token)
    }

    /// Armed timer token, if any
    pub fn armed_token(&self) -> Option<TimerToken> {
        self.timer.armed_token()
    }

    /// Time left before auto-close
    pub fn remaining(&self) -> Option<Duration> {
        self.timer.remaining()
    }

    /// Configured auto-close delay
    pub fn ad_duration(&self) -> Duration {
        self.ad_duration
    }
}
