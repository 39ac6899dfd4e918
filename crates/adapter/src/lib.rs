//! Adapter module - remote control via TCP socket with a JSON protocol
//!
//! Lets an external agent (a bot, a test harness, a replay tool) play the
//! board over a TCP connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: client connects (default: 127.0.0.1:7878)
//! 2. **Handshake**: client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: first client to hello becomes the controller
//! 4. **Observation Streaming**: after every engine change the server sends an
//!    `observation` (board, state, score, signals since the last one)
//! 5. **Commanding**: the controller sends `command`s; each gets an `ack` or
//!    an `error` once the game loop has applied it
//!
//! ## Client → Server
//!
//! - **hello**: handshake with client info and requested role
//! - **command**: `select`, `swap`, `debug` or `restart`
//! - **control**: claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**, **observation**, **ack**, **error**
//!
//! # Environment Variables
//!
//! - `MATCH3_AI_HOST`: bind address (default: "127.0.0.1")
//! - `MATCH3_AI_PORT`: port number (default: 7878)
//! - `MATCH3_AI_MAX_PENDING`: bounded command queue size (default: 10)
//! - `MATCH3_AI_DISABLED`: set to "1" or "true" to disable the adapter
//!
//! # Example
//!
//! ```text
//! -> {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0"}
//! <- {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! <- {"type":"observation","seq":2,"ts":...,"playable":true,"board":{...},"score":0,...}
//! -> {"type":"command","seq":2,"ts":0,"action":"swap","cell":{"col":3,"row":4},"target":{"col":4,"row":4}}
//! <- {"type":"ack","seq":2,"ts":...,"status":"ok","outcome":"swap_accepted"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_match3_core as core;
pub use tui_match3_engine as engine;
pub use tui_match3_types as types;

pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{build_observation, outcome_tag, reply_for, run_server, ServerConfig};
