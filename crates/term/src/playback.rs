//! Timed animation playback for the terminal.
//!
//! Requests from the engine are queued and played one after another on the
//! game loop clock. When an awaited animation finishes its completion is sent
//! back; the engine picks it up on its next `pump`.

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender};

use crate::core::TileMove;
use crate::engine::{AnimationDone, AnimationKind, AnimationRequest};
use crate::types::{
    Coord, TileKind, FALL_ANIM_MS, POP_ANIM_MS, REJECTED_SWAP_ANIM_MS, SWAP_ANIM_MS,
};

/// Time position inside one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tween {
    pub elapsed: u32,
    pub total: u32,
}

impl Tween {
    /// Progress in `0..=den`.
    pub fn scaled(&self, den: u32) -> u32 {
        if self.total == 0 {
            return den;
        }
        self.elapsed.min(self.total) * den / self.total
    }
}

/// What to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimFrame<'a> {
    Swap {
        a: Coord,
        b: Coord,
        tween: Tween,
    },
    Rejected {
        a: Coord,
        b: Coord,
        tween: Tween,
    },
    Pop {
        cells: &'a [Coord],
        tween: Tween,
    },
    Fall {
        falls: &'a [TileMove],
        refills: &'a [(Coord, TileKind)],
        tween: Tween,
    },
}

fn duration_of(kind: &AnimationKind) -> u32 {
    match kind {
        AnimationKind::Swap { .. } => SWAP_ANIM_MS,
        AnimationKind::RejectedSwap { .. } => REJECTED_SWAP_ANIM_MS,
        AnimationKind::Cascade(_) => POP_ANIM_MS + FALL_ANIM_MS,
    }
}

struct Active {
    request: AnimationRequest,
    elapsed: u32,
}

pub struct TimedPlayback {
    requests: Receiver<AnimationRequest>,
    done: Sender<AnimationDone>,
    queue: VecDeque<AnimationRequest>,
    active: Option<Active>,
    /// Percentage of real time (100 = normal speed).
    speed: u32,
}

impl TimedPlayback {
    pub fn new(requests: Receiver<AnimationRequest>, done: Sender<AnimationDone>) -> Self {
        Self {
            requests,
            done,
            queue: VecDeque::new(),
            active: None,
            speed: 100,
        }
    }

    pub fn with_speed(mut self, percent: u32) -> Self {
        self.speed = percent.max(1);
        self
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some() || !self.queue.is_empty()
    }

    /// Advance the clock. Returns the number of completions sent.
    pub fn tick(&mut self, elapsed_ms: u32) -> usize {
        self.queue.extend(self.requests.try_iter());

        let mut budget = elapsed_ms.saturating_mul(self.speed) / 100;
        let mut acked = 0;
        loop {
            if self.active.is_none() {
                match self.queue.pop_front() {
                    Some(request) => self.active = Some(Active { request, elapsed: 0 }),
                    None => break,
                }
            }
            let Some(active) = self.active.as_mut() else {
                break;
            };
            let total = duration_of(&active.request.kind);
            let left = total.saturating_sub(active.elapsed);
            if budget < left {
                active.elapsed += budget;
                break;
            }
            budget -= left;
            if let Some(finished) = self.active.take() {
                if self.finish(finished.request) {
                    acked += 1;
                }
            }
        }
        acked
    }

    /// Finish everything immediately (restart, quit).
    pub fn skip_all(&mut self) -> usize {
        self.queue.extend(self.requests.try_iter());
        let mut acked = 0;
        let pending: Vec<AnimationRequest> = self
            .active
            .take()
            .map(|a| a.request)
            .into_iter()
            .chain(self.queue.drain(..))
            .collect();
        for request in pending {
            if self.finish(request) {
                acked += 1;
            }
        }
        acked
    }

    /// Forget everything without acknowledging (new board).
    pub fn reset(&mut self) {
        self.active = None;
        self.queue.clear();
        while self.requests.try_recv().is_ok() {}
    }

    fn finish(&self, request: AnimationRequest) -> bool {
        if !request.awaits_ack {
            return false;
        }
        if self.done.send(AnimationDone { id: request.id }).is_err() {
            tracing::warn!(id = request.id.0, "engine gone; completion dropped");
            return false;
        }
        true
    }

    /// Current frame, if an animation is playing.
    pub fn frame(&self) -> Option<AnimFrame<'_>> {
        let active = self.active.as_ref()?;
        let elapsed = active.elapsed;
        Some(match &active.request.kind {
            AnimationKind::Swap { a, b } => AnimFrame::Swap {
                a: *a,
                b: *b,
                tween: Tween {
                    elapsed,
                    total: SWAP_ANIM_MS,
                },
            },
            AnimationKind::RejectedSwap { a, b } => AnimFrame::Rejected {
                a: *a,
                b: *b,
                tween: Tween {
                    elapsed,
                    total: REJECTED_SWAP_ANIM_MS,
                },
            },
            AnimationKind::Cascade(step) if elapsed < POP_ANIM_MS => AnimFrame::Pop {
                cells: &step.removed,
                tween: Tween {
                    elapsed,
                    total: POP_ANIM_MS,
                },
            },
            AnimationKind::Cascade(step) => AnimFrame::Fall {
                falls: &step.falls,
                refills: &step.refills,
                tween: Tween {
                    elapsed: elapsed - POP_ANIM_MS,
                    total: FALL_ANIM_MS,
                },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnimationId;
    use crossbeam_channel::unbounded;

    fn swap_req(id: u64, awaits_ack: bool) -> AnimationRequest {
        AnimationRequest {
            id: AnimationId(id),
            kind: AnimationKind::Swap {
                a: Coord::new(0, 0),
                b: Coord::new(1, 0),
            },
            awaits_ack,
        }
    }

    #[test]
    fn test_acks_after_duration() {
        let (req_tx, req_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        let mut playback = TimedPlayback::new(req_rx, done_tx);

        req_tx.send(swap_req(1, true)).unwrap();
        assert_eq!(playback.tick(SWAP_ANIM_MS - 1), 0);
        assert!(matches!(playback.frame(), Some(AnimFrame::Swap { .. })));
        assert_eq!(playback.tick(1), 1);
        assert_eq!(done_rx.try_recv().unwrap().id, AnimationId(1));
        assert!(!playback.is_playing());
    }

    #[test]
    fn test_fire_and_forget_not_acked() {
        let (req_tx, req_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        let mut playback = TimedPlayback::new(req_rx, done_tx);

        req_tx.send(swap_req(1, false)).unwrap();
        req_tx.send(swap_req(2, true)).unwrap();
        assert_eq!(playback.tick(SWAP_ANIM_MS * 2), 1);
        assert_eq!(done_rx.try_recv().unwrap().id, AnimationId(2));
        assert!(done_rx.try_recv().is_err());
    }

    #[test]
    fn test_skip_all() {
        let (req_tx, req_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        let mut playback = TimedPlayback::new(req_rx, done_tx);
        req_tx.send(swap_req(1, true)).unwrap();
        req_tx.send(swap_req(2, true)).unwrap();
        playback.tick(1);
        assert_eq!(playback.skip_all(), 2);
        assert_eq!(done_rx.try_iter().count(), 2);
    }

    #[test]
    fn test_tween_scaling() {
        let t = Tween {
            elapsed: 50,
            total: 200,
        };
        assert_eq!(t.scaled(4), 1);
        assert_eq!(Tween { elapsed: 0, total: 0 }.scaled(4), 4);
    }
}
