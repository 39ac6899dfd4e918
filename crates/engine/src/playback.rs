//! Instant playback - acknowledges every animation as soon as it is requested
//!
//! Used for headless sessions (remote control, benches, tests) where nothing
//! is drawn but the engine still waits for completions.

use crossbeam_channel::{Receiver, Sender};

use tui_match3_core::{BoardResult, TileSource};

use crate::engine::BoardEngine;
use crate::events::{AnimationDone, AnimationRequest};

pub struct InstantPlayback {
    requests: Receiver<AnimationRequest>,
    done: Sender<AnimationDone>,
    seen: u64,
}

impl InstantPlayback {
    pub fn attach<R: TileSource>(engine: &BoardEngine<R>) -> Self {
        Self {
            requests: engine.animation_requests(),
            done: engine.completion_sender(),
            seen: 0,
        }
    }

    /// Acknowledge every queued request. Returns how many were acknowledged.
    pub fn acknowledge_all(&mut self) -> usize {
        let mut acked = 0;
        while let Ok(req) = self.requests.try_recv() {
            self.seen += 1;
            if req.awaits_ack && self.done.send(AnimationDone { id: req.id }).is_ok() {
                acked += 1;
            }
        }
        acked
    }

    /// Requests observed so far, acknowledged or not.
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

/// Drive the engine until it is idle again.
///
/// Returns the number of completions delivered.
pub fn run_until_idle<R: TileSource>(
    engine: &mut BoardEngine<R>,
    playback: &mut InstantPlayback,
) -> BoardResult<usize> {
    let mut delivered = 0;
    while !engine.state().is_idle() {
        playback.acknowledge_all();
        let n = engine.pump()?;
        if n == 0 {
            // Nothing in flight for the pending animation; another layer owns it.
            break;
        }
        delivered += n;
    }
    Ok(delivered)
}
