//! Long-poll loop used while waiting on the remote side of an online game.
//!
//! The loop waits one interval, asks the controller `{"action":"long_poll"}`
//! and repeats until a response carries `resume: true` or the stop flag is
//! raised. On resume the step named by the response signal is shown.
//!
//! ERROR HANDLING
//! ==============
//! A failed poll is logged and the loop keeps going; the next tick retries.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "polling_test.rs"]
mod polling_test;

use std::cell::Cell;

use serde_json::{Map, Value};

use crate::net::api::Backend;
use crate::session::Session;
use crate::util::surface::Surface;

/// Window event that starts the loop.
pub const START_LONG_POLL_EVENT: &str = "start_long_poll";
/// Window event that stops the loop.
pub const STOP_LONG_POLL_EVENT: &str = "stop_long_poll";

/// One suspended wait per poll interval.
#[allow(async_fn_in_trait)]
pub trait Ticker {
    async fn tick(&self, interval_ms: u32);
}

/// Browser ticker backed by `gloo-timers`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimerTicker;

impl Ticker for TimerTicker {
    async fn tick(&self, interval_ms: u32) {
        #[cfg(feature = "hydrate")]
        {
            gloo_timers::future::TimeoutFuture::new(interval_ms).await;
        }
        #[cfg(not(feature = "hydrate"))]
        {
            log::debug!("no timer outside the browser; tick of {interval_ms} ms returns at once");
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The backend resumed the game, optionally naming the next step.
    Resumed { signal: Option<String> },
    /// The stop flag was raised.
    Stopped,
}

fn long_poll_payload() -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("action".to_owned(), Value::String("long_poll".to_owned()));
    payload
}

/// Poll until resumed or stopped. `stop` is checked after every tick.
pub async fn run_long_poll<B: Backend, S: Surface, T: Ticker>(
    session: &Session<B, S>,
    ticker: &T,
    stop: &Cell<bool>,
) -> PollOutcome {
    let interval = session.config().long_poll_interval_ms;
    loop {
        ticker.tick(interval).await;
        if stop.get() {
            log::info!("long poll stopped");
            return PollOutcome::Stopped;
        }
        match session.send(long_poll_payload(), true).await {
            Ok(resp) if resp.resume => {
                log::info!("long poll resumed with signal {:?}", resp.signal);
                if let Some(signal) = &resp.signal {
                    session.activate_step(signal);
                }
                return PollOutcome::Resumed { signal: resp.signal };
            }
            Ok(_) => {}
            Err(e) => log::warn!("long poll request failed: {e}"),
        }
    }
}
