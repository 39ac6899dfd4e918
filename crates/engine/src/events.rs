//! Event bus between the board engine and its collaborators
//!
//! ```text
//! ┌──────────────┐  AnimationRequest   ┌──────────────┐
//! │ BoardEngine  │────────────────────>│   Playback   │
//! │              │<────────────────────│ (term/instant)│
//! └──────┬───────┘    AnimationDone    └──────────────┘
//!        │ Signal (tiles_popped, resolution_settled)
//!        v
//! ┌──────────────┐
//! │  Subscribers │  scoring, UI, remote observers
//! └──────────────┘
//! ```
//!
//! The signal vocabulary is fixed: exactly [`SignalKind::TilesPopped`] and
//! [`SignalKind::ResolutionSettled`]. Animation traffic uses its own pair of
//! channels; `AnimationDone` is the only message that advances the engine.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use tui_match3_core::CascadeStep;
use tui_match3_types::Coord;

/// Names of the subscribable signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    TilesPopped,
    ResolutionSettled,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::TilesPopped => "tiles_popped",
            SignalKind::ResolutionSettled => "resolution_settled",
        }
    }
}

/// Signals published by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    /// One resolution pass removed `count` gems at `coords`.
    TilesPopped {
        pass: u32,
        coords: Vec<Coord>,
        count: usize,
    },
    /// The board is idle again after a cascade.
    ResolutionSettled { passes: u32, popped: usize },
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::TilesPopped { .. } => SignalKind::TilesPopped,
            Signal::ResolutionSettled { .. } => SignalKind::ResolutionSettled,
        }
    }
}

/// Fire-and-forget requests kept queued for a playback layer that lags or is absent.
pub const REQUEST_BACKLOG: usize = 32;

/// Identifies one animation request; acknowledgements must echo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AnimationId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationKind {
    /// Accepted swap: `a` and `b` trade places.
    Swap { a: Coord, b: Coord },
    /// Swap that formed no match; the grid has already been reverted.
    RejectedSwap { a: Coord, b: Coord },
    /// Pop, fall and refill of one resolution pass.
    Cascade(CascadeStep),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationRequest {
    pub id: AnimationId,
    pub kind: AnimationKind,
    /// Whether the engine is waiting for an [`AnimationDone`] with this id.
    pub awaits_ack: bool,
}

/// Completion message from the visual layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationDone {
    pub id: AnimationId,
}

struct Subscriber {
    filter: Option<SignalKind>,
    tx: Sender<Signal>,
}

/// Channels owned by the engine.
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    request_tx: Sender<AnimationRequest>,
    request_rx: Receiver<AnimationRequest>,
    done_tx: Sender<AnimationDone>,
    done_rx: Receiver<AnimationDone>,
    next_id: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("pending_requests", &self.request_rx.len())
            .field("pending_done", &self.done_rx.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (request_tx, request_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        Self {
            subscribers: Vec::new(),
            request_tx,
            request_rx,
            done_tx,
            done_rx,
            next_id: 1,
        }
    }

    /// Receive every signal of one kind.
    pub fn subscribe(&mut self, kind: SignalKind) -> Receiver<Signal> {
        self.add_subscriber(Some(kind))
    }

    /// Receive every signal.
    pub fn subscribe_all(&mut self) -> Receiver<Signal> {
        self.add_subscriber(None)
    }

    fn add_subscriber(&mut self, filter: Option<SignalKind>) -> Receiver<Signal> {
        let (tx, rx) = unbounded();
        self.subscribers.push(Subscriber { filter, tx });
        rx
    }

    /// Fan a signal out to matching subscribers.
    ///
    /// Subscribers whose receiver was dropped are removed. Returns the number
    /// of deliveries.
    pub fn publish(&mut self, signal: Signal) -> usize {
        let kind = signal.kind();
        let mut delivered = 0;
        self.subscribers.retain(|sub| {
            if sub.filter.is_some_and(|f| f != kind) {
                return true;
            }
            match sub.tx.send(signal.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        tracing::trace!(signal = kind.as_str(), delivered, "published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Receiver for animation requests (clone for multiple playback layers).
    pub fn animation_requests(&self) -> Receiver<AnimationRequest> {
        self.request_rx.clone()
    }

    /// Sender the playback layer uses to report completions.
    pub fn completion_sender(&self) -> Sender<AnimationDone> {
        self.done_tx.clone()
    }

    /// Queue an animation request and return its id.
    ///
    /// Fire-and-forget requests evict the oldest queued ones once
    /// [`REQUEST_BACKLOG`] are waiting, so a bus nobody drains stays bounded.
    pub(crate) fn request(&mut self, kind: AnimationKind, awaits_ack: bool) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        if !awaits_ack {
            // Only issued while idle, so nothing the engine waits on is queued.
            let mut dropped = 0usize;
            while self.request_rx.len() >= REQUEST_BACKLOG && self.request_rx.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                tracing::trace!(dropped, "stale animation requests evicted");
            }
        }
        // The bus holds a receiver itself, so the channel never disconnects.
        let _ = self.request_tx.send(AnimationRequest {
            id,
            kind,
            awaits_ack,
        });
        id
    }

    pub(crate) fn try_recv_done(&self) -> Option<AnimationDone> {
        self.done_rx.try_recv().ok()
    }

    /// Drop queued requests and completions (new board).
    pub(crate) fn discard_animations(&self) {
        while self.request_rx.try_recv().is_ok() {}
        while self.done_rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn popped(count: usize) -> Signal {
        Signal::TilesPopped {
            pass: 1,
            coords: vec![Coord::new(0, 0); count],
            count,
        }
    }

    #[test]
    fn test_filtered_subscription() {
        let mut bus = EventBus::new();
        let pops = bus.subscribe(SignalKind::TilesPopped);
        let settles = bus.subscribe(SignalKind::ResolutionSettled);
        let all = bus.subscribe_all();

        assert_eq!(bus.publish(popped(3)), 2);
        assert_eq!(
            bus.publish(Signal::ResolutionSettled {
                passes: 1,
                popped: 3
            }),
            2
        );

        assert_eq!(pops.try_iter().count(), 1);
        assert_eq!(settles.try_iter().count(), 1);
        assert_eq!(all.try_iter().count(), 2);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe_all();
        let gone = bus.subscribe_all();
        drop(gone);

        assert_eq!(bus.publish(popped(3)), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert!(keep.try_recv().is_ok());
    }

    #[test]
    fn test_request_ids_increase() {
        let mut bus = EventBus::new();
        let rx = bus.animation_requests();
        let a = Coord::new(0, 0);
        let b = Coord::new(1, 0);
        let first = bus.request(AnimationKind::Swap { a, b }, true);
        let second = bus.request(AnimationKind::RejectedSwap { a, b }, false);
        assert!(second > first);

        let got: Vec<AnimationRequest> = rx.try_iter().collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].id, first);
        assert!(!got[1].awaits_ack);
    }

    #[test]
    fn test_unconsumed_requests_stay_bounded() {
        let mut bus = EventBus::new();
        let a = Coord::new(0, 0);
        let b = Coord::new(1, 0);
        let mut last = AnimationId(0);
        for _ in 0..REQUEST_BACKLOG * 4 {
            last = bus.request(AnimationKind::RejectedSwap { a, b }, false);
        }
        assert_eq!(bus.request_rx.len(), REQUEST_BACKLOG);

        // The newest request survives; the oldest were evicted.
        let got: Vec<AnimationRequest> = bus.animation_requests().try_iter().collect();
        assert_eq!(got.last().map(|r| r.id), Some(last));
        assert_eq!(got[0].id, AnimationId(last.0 - REQUEST_BACKLOG as u64 + 1));
    }

    #[test]
    fn test_awaited_requests_are_never_evicted() {
        let mut bus = EventBus::new();
        let a = Coord::new(0, 0);
        let b = Coord::new(1, 0);
        for _ in 0..REQUEST_BACKLOG + 5 {
            bus.request(AnimationKind::Swap { a, b }, true);
        }
        assert_eq!(bus.request_rx.len(), REQUEST_BACKLOG + 5);
    }

    #[test]
    fn test_signal_names() {
        assert_eq!(SignalKind::TilesPopped.as_str(), "tiles_popped");
        assert_eq!(SignalKind::ResolutionSettled.as_str(), "resolution_settled");
        let json = serde_json::to_string(&Signal::ResolutionSettled {
            passes: 2,
            popped: 6,
        })
        .unwrap();
        assert!(json.contains("\"signal\":\"resolution_settled\""));
    }
}
