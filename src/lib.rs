//! # wiresx - Wires-X Control Channel for a YSF Gateway
//!
//! Answers Wires-X control requests from System Fusion radios on behalf of a
//! YSF gateway. Radios ask the gateway who it is (DX), which reflectors are
//! online (ALL), and to link to or unlink from a reflector; the gateway
//! answers with byte-exact multi-frame replies.
//!
//! ## Features
//!
//! - **Request recognition**: DX, ALL, Connect and Disconnect commands in DataFR frames
//! - **Deferred replies**: one reply per request burst, sent after a short settle delay
//! - **Reflector directory**: hosts list with periodic status probes and liveness tracking
//! - **Deterministic timing**: every timer advances from an explicit millisecond tick
//! - **Async runtime**: tokio UDP sockets for the repeater link and status probes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wiresx::config::Config;
//! use wiresx::gateway::Gateway;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("wiresx.toml").await?;
//!     let mut gateway = Gateway::new(&config).await?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`wiresx`] - control-request engine, identity and reply layouts
//! - [`reflectors`] - reflector directory and hosts list parsing
//! - [`ysf`] - YSF frame constants, FICH fields, slot codec and timers
//! - [`network`] - UDP transport for frames and status probes
//! - [`gateway`] - runtime loop binding the engine to the repeater
//! - [`config`] - configuration management and validation
//! - [`validation`] - fixed-width field and callsign helpers
//! - [`logutil`] - log formatting for raw radio fields
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    Gateway      │ ← Socket loop and tick
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  WiresX Engine  │ ← Request recognition and replies
//! └─────────────────┘
//!     │          │
//! ┌────────┐ ┌────────────┐
//! │  YSF   │ │ Reflector  │ ← Frame coding / directory
//! │ codec  │ │ directory  │
//! └────────┘ └────────────┘
//! ```

pub mod config;
pub mod gateway;
pub mod logutil;
pub mod network;
pub mod reflectors;
pub mod validation;
pub mod wiresx;
pub mod ysf;
