//! TCP server for the remote controller
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::{BoardError, BoardResult};
use crate::engine::{BoardSnapshot, IgnoreReason, IntentOutcome, Signal};
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// Stable 64-bit FNV-1a hasher for a deterministic `state_hash`.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Read `MATCH3_AI_HOST`, `MATCH3_AI_PORT` and `MATCH3_AI_MAX_PENDING`.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("MATCH3_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("MATCH3_AI_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("MATCH3_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
            ..defaults
        }
    }

    pub fn is_disabled() -> bool {
        std::env::var("MATCH3_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Enforce strictly increasing `seq` per client.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

impl ClientOutbound {
    fn write_json(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        match self {
            ClientOutbound::Welcome(m) => serde_json::to_writer(&mut *buf, m),
            ClientOutbound::Ack(m) => serde_json::to_writer(&mut *buf, m),
            ClientOutbound::Error(m) => serde_json::to_writer(&mut *buf, m),
            ClientOutbound::Observation(m) => serde_json::to_writer(&mut *buf, m),
        }
    }
}

/// Start the TCP server. Sends the bound address on `ready_tx` once listening.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind adapter on {}", addr))?;
    let bound = listener.local_addr()?;
    tracing::info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state
                            .send_to(client_id, ClientOutbound::Observation(obs))
                            .await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        tracing::info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                tracing::warn!(client_id, error = %e, "client error");
            }
            tracing::info!(client_id, "client disconnected");
        });
    }
}

async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if msg.write_json(&mut buf).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let major = state.config.protocol_version.split('.').next().unwrap_or("");
                if hello.protocol_version.split('.').next() != Some(major) {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                }

                // First client to hello becomes controller unless it asked to observe.
                let wants_control = hello.requested.role != Some(RequestedRole::Observer);
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    if controller.is_none() && wants_control {
                        *controller = Some(client_id);
                        tracing::info!(client_id, "client is now controller");
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|id| id as u64))
                };

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !state.is_controller(client_id).await {
                    reply_error(cmd.seq, ErrorCode::NotController, "only the controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        reply_error(cmd.seq, ErrorCode::InvalidCommand, &message);
                        continue;
                    }
                };

                // Ack is sent by the game loop once the command is applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(ctrl.seq, ErrorCode::HandshakeRequired, "send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    reply_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let mut controller = state.controller.write().await;
                match ctrl.action {
                    ControlAction::Claim if controller.is_none() => {
                        *controller = Some(client_id);
                        tracing::info!(client_id, "controller claimed");
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, AckStatus::Ok, Some("claimed"))));
                    }
                    ControlAction::Claim => {
                        reply_error(ctrl.seq, ErrorCode::ControllerActive, "controller already assigned");
                    }
                    ControlAction::Release if *controller == Some(client_id) => {
                        *controller = None;
                        tracing::info!(client_id, "controller released");
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, AckStatus::Ok, Some("released"))));
                    }
                    ControlAction::Release => {
                        reply_error(ctrl.seq, ErrorCode::NotController, "only the controller may release");
                    }
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                reply_error(unknown.seq, ErrorCode::InvalidCommand, "unknown message type");
            }

            Err(e) => {
                reply_error(0, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    // Remove the client and promote the lowest remaining handshaken client.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);
        if *controller == Some(client_id) {
            *controller = clients
                .iter()
                .filter(|c| c.handshaken)
                .map(|c| c.id)
                .min();
            match *controller {
                Some(next) => tracing::info!(next, "controller promoted"),
                None => tracing::info!(client_id, "controller released"),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

/// Check a command's cells against its action.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, String> {
    let need_cell = || {
        cmd.cell
            .ok_or_else(|| format!("{} requires a cell", cmd.action.as_str()))
    };
    match cmd.action {
        CommandAction::Select => need_cell().map(ClientCommand::Select),
        CommandAction::Debug => need_cell().map(ClientCommand::Debug),
        CommandAction::Swap => {
            let a = need_cell()?;
            let b = cmd
                .target
                .ok_or_else(|| "swap requires a target".to_string())?;
            Ok(ClientCommand::Swap(a, b))
        }
        CommandAction::Restart => Ok(ClientCommand::Restart),
    }
}

/// Short tag for an intent outcome, as sent in acks.
pub fn outcome_tag(outcome: &IntentOutcome) -> &'static str {
    match outcome {
        IntentOutcome::Armed(_) => "armed",
        IntentOutcome::Disarmed(_) => "disarmed",
        IntentOutcome::Moved { .. } => "moved",
        IntentOutcome::SwapAccepted { .. } => "swap_accepted",
        IntentOutcome::SwapRejected { .. } => "swap_rejected",
        IntentOutcome::KindChanged { .. } => "kind_changed",
        IntentOutcome::Restarted => "restarted",
        IntentOutcome::Ignored(IgnoreReason::NotInitialized) => "not_initialized",
        IntentOutcome::Ignored(IgnoreReason::Busy(_)) => "busy",
        IntentOutcome::Ignored(IgnoreReason::DebugDisabled) => "debug_disabled",
    }
}

/// Turn the engine's answer to a command into the reply for its sender.
pub fn reply_for(client_id: usize, seq: u64, result: &BoardResult<IntentOutcome>) -> OutboundMessage {
    match result {
        Ok(outcome) => {
            let status = match outcome {
                IntentOutcome::Ignored(_) => AckStatus::Ignored,
                _ => AckStatus::Ok,
            };
            OutboundMessage::ToClientAck {
                client_id,
                ack: create_ack(seq, status, Some(outcome_tag(outcome))),
            }
        }
        Err(e) => {
            let code = match e {
                BoardError::OutOfBounds { .. } => ErrorCode::OutOfBounds,
                BoardError::NotAdjacent { .. } => ErrorCode::NotAdjacent,
                BoardError::CascadeOverflow { .. } => ErrorCode::BoardJammed,
                BoardError::InvalidConfiguration(_) => ErrorCode::InvalidCommand,
            };
            OutboundMessage::ToClientError {
                client_id,
                err: create_error(seq, code, &e.to_string()),
            }
        }
    }
}

/// Build an observation from an engine snapshot.
pub fn build_observation(
    snapshot: BoardSnapshot,
    score: ScoreView,
    signals: Vec<Signal>,
    seq: u64,
) -> ObservationMessage {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    snapshot.width.hash(&mut hasher);
    snapshot.height.hash(&mut hasher);
    snapshot.cells.hash(&mut hasher);
    snapshot.state.hash(&mut hasher);
    snapshot.selected.hash(&mut hasher);
    snapshot.board_id.hash(&mut hasher);
    snapshot.halted.hash(&mut hasher);
    score.score.hash(&mut hasher);
    score.combo.hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snapshot.playable(),
        board: snapshot,
        score,
        signals,
        state_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, EngineState};

    fn snapshot(cells: Vec<Vec<u8>>) -> BoardSnapshot {
        BoardSnapshot {
            width: cells[0].len() as u8,
            height: cells.len() as u8,
            cells,
            state: EngineState::Idle,
            selected: None,
            board_id: 1,
            halted: false,
        }
    }

    #[test]
    fn test_map_command_requires_cells() {
        let swap = create_command(1, CommandAction::Swap, Some(Coord::new(0, 0)), None);
        assert!(map_command(&swap).is_err());

        let select = create_command(2, CommandAction::Select, None, None);
        assert_eq!(map_command(&select).unwrap_err(), "select requires a cell");

        let restart = create_command(3, CommandAction::Restart, None, None);
        assert_eq!(map_command(&restart).unwrap(), ClientCommand::Restart);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 7878);
        let bad = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_state_hash_tracks_board() {
        let a = build_observation(snapshot(vec![vec![1, 2], vec![2, 1]]), ScoreView::default(), Vec::new(), 1);
        let b = build_observation(snapshot(vec![vec![1, 2], vec![2, 1]]), ScoreView::default(), Vec::new(), 2);
        let c = build_observation(snapshot(vec![vec![2, 2], vec![2, 1]]), ScoreView::default(), Vec::new(), 3);
        assert_eq!(a.state_hash, b.state_hash);
        assert_ne!(a.state_hash, c.state_hash);
        assert!(a.playable);
    }

    #[test]
    fn test_reply_for_maps_errors_and_ignores() {
        let err: BoardResult<IntentOutcome> = Err(BoardError::NotAdjacent {
            a: Coord::new(0, 0),
            b: Coord::new(2, 0),
        });
        match reply_for(4, 9, &err) {
            OutboundMessage::ToClientError { client_id, err } => {
                assert_eq!(client_id, 4);
                assert_eq!(err.code, ErrorCode::NotAdjacent);
                assert_eq!(err.seq, 9);
            }
            other => panic!("unexpected {:?}", other),
        }

        let busy = Ok(IntentOutcome::Ignored(IgnoreReason::Busy(
            EngineState::AwaitingCascadeAnimation,
        )));
        match reply_for(4, 10, &busy) {
            OutboundMessage::ToClientAck { ack, .. } => {
                assert_eq!(ack.status, AckStatus::Ignored);
                assert_eq!(ack.outcome.as_deref(), Some("busy"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
