//! Terminal match-3 runner (default binary).
//!
//! Uses crossterm for keyboard and mouse input, a framebuffer-based renderer,
//! and timed playback of the engine's animation requests. An optional TCP
//! adapter lets a remote controller play the same board.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};

use tui_match3::adapter::{
    build_observation, reply_for, Adapter, InboundPayload, OutboundMessage,
};
use tui_match3::core::SeededTiles;
use tui_match3::input::{should_quit, CursorController, PointerGesture};
use tui_match3::term::{
    AdapterStatusView, FrameBuffer, GameView, TerminalRenderer, TimedPlayback, Viewport,
};
use tui_match3::types::{PlayerIntent, TICK_MS};
use tui_match3::{logging, CliArgs, GameConfig, GameSession, HighScoreStore};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let log_path = logging::init_from_env()?;
    let mut config = GameConfig::load(args.config.as_deref())?;
    config.apply_env()?;
    tracing::info!(?log_path, seed = ?config.seed, "starting");

    let store = HighScoreStore::new(
        config
            .high_score_path
            .clone()
            .unwrap_or_else(HighScoreStore::default_path),
    );
    let high_score = store.load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring high score file");
        0
    });

    let adapter = match Adapter::start_from_env() {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(error = %e, "remote control unavailable");
            None
        }
    };

    let mut term = TerminalRenderer::new();
    if args.no_mouse {
        term = term.without_mouse();
    }
    term.enter()?;

    let result = run(&mut term, &config, high_score, adapter);

    // Always try to restore terminal state.
    let _ = term.exit();

    let final_score = result?;
    if let Err(e) = store.save_if_higher(final_score) {
        eprintln!("could not save high score: {e:#}");
    }
    Ok(())
}

struct Remote {
    adapter: Adapter,
    clients: BTreeSet<usize>,
    controller: Option<usize>,
    obs_seq: u64,
}

impl Remote {
    fn status(&self) -> AdapterStatusView {
        AdapterStatusView {
            enabled: true,
            client_count: self.clients.len().min(usize::from(u16::MAX)) as u16,
            controller_id: self.controller,
        }
    }
}

/// Play until the user quits. Returns the best score reached.
fn run(
    term: &mut TerminalRenderer,
    config: &GameConfig,
    high_score: u32,
    adapter: Option<Adapter>,
) -> Result<u32> {
    let tiles = SeededTiles::new(config.resolved_seed(), config.engine.gem_count)?;
    let mut session = GameSession::new(config, tiles, high_score)?;
    let mut playback = TimedPlayback::new(
        session.engine().animation_requests(),
        session.engine().completion_sender(),
    );

    let view = GameView::default();
    let (board_w, board_h) = (config.engine.width, config.engine.height);
    let mut cursor = CursorController::new(board_w, board_h);
    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut viewport = Viewport::new(w, h);
    let mut pointer = PointerGesture::new(view.mapper(viewport, board_w, board_h));
    let mut remote = adapter.map(|adapter| Remote {
        adapter,
        clients: BTreeSet::new(),
        controller: None,
        obs_seq: 0,
    });

    let mut fb = FrameBuffer::new(viewport.width, viewport.height);
    let tick_duration = Duration::from_millis(u64::from(TICK_MS));
    let mut last_tick = Instant::now();
    let mut best = high_score;

    loop {
        // Render.
        let snap = session.engine().snapshot();
        let status = remote.as_ref().map(Remote::status);
        view.render_into(
            &snap,
            &session.hud(),
            Some(cursor.cursor()),
            playback.frame(),
            status.as_ref(),
            viewport,
            &mut fb,
        );
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        let mut changed = false;
        if event::poll(timeout)? {
            let intent = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(best.max(session.scores().high_score()));
                    }
                    cursor.handle_key(key)
                }
                Event::Mouse(ev) => {
                    let intent = pointer.handle_mouse(ev);
                    if let Some(PlayerIntent::Select(c) | PlayerIntent::Swap(_, c)) = intent {
                        cursor.set_cursor(c);
                    }
                    intent
                }
                Event::Resize(w, h) => {
                    viewport = Viewport::new(w, h);
                    pointer.set_mapper(view.mapper(viewport, board_w, board_h));
                    term.invalidate();
                    None
                }
                _ => None,
            };
            if let Some(intent) = intent {
                let _ = apply(&mut session, &mut playback, &mut best, intent);
                changed = true;
            }
        }

        // Remote commands.
        if let Some(remote) = remote.as_mut() {
            while let Some(cmd) = remote.adapter.try_recv() {
                remote.clients.insert(cmd.client_id);
                match cmd.payload {
                    InboundPayload::Command(command) => {
                        remote.controller = Some(cmd.client_id);
                        let result =
                            apply(&mut session, &mut playback, &mut best, command.into_intent());
                        remote.adapter.send(reply_for(cmd.client_id, cmd.seq, &result));
                        changed = true;
                    }
                    InboundPayload::SnapshotRequest => {
                        remote.obs_seq += 1;
                        let obs = build_observation(
                            session.engine().snapshot(),
                            session.score_view(),
                            Vec::new(),
                            remote.obs_seq,
                        );
                        remote.adapter.send(OutboundMessage::ToClientObservation {
                            client_id: cmd.client_id,
                            obs,
                        });
                    }
                }
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            if playback.tick(TICK_MS) > 0 {
                changed = true;
            }
            match session.update(TICK_MS) {
                Ok(n) => changed |= n > 0,
                Err(e) => {
                    tracing::warn!(error = %e, "board halted");
                    changed = true;
                }
            }
            best = best.max(session.scores().high_score());
        }

        if let Some(remote) = remote.as_mut() {
            let signals = session.take_signals();
            if changed || !signals.is_empty() {
                remote.obs_seq += 1;
                let obs = build_observation(
                    session.engine().snapshot(),
                    session.score_view(),
                    signals,
                    remote.obs_seq,
                );
                remote
                    .adapter
                    .send(OutboundMessage::BroadcastObservation { obs });
            }
        }
    }
}

/// Apply an intent from any source; a restart also drops queued animations.
fn apply(
    session: &mut GameSession<SeededTiles>,
    playback: &mut TimedPlayback,
    best: &mut u32,
    intent: PlayerIntent,
) -> tui_match3::core::BoardResult<tui_match3::engine::IntentOutcome> {
    *best = (*best).max(session.scores().high_score());
    let result = session.apply(intent);
    if matches!(result, Ok(tui_match3::engine::IntentOutcome::Restarted)) {
        playback.reset();
    }
    result
}
