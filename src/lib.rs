//! Circuit-breaker governed reverse proxy gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────┐
//!                     │                  BREAKER GATEWAY                  │
//!                     │                                                   │
//!   Client Request    │  ┌─────────┐    ┌──────────┐    ┌─────────────┐  │
//!   ──────────────────┼─▶│ gateway │───▶│ routing  │───▶│  breaker    │  │
//!                     │  │ server  │    │  table   │    │  registry   │  │
//!                     │  └─────────┘    └──────────┘    └──────┬──────┘  │
//!                     │                                        │         │
//!                     │                                        ▼         │
//!                     │  ┌──────────────────────────────────────────┐    │
//!                     │  │ intercept: permission gate + outcome     │    │
//!                     │  │ tracking around the upstream call        │    │
//!                     │  └──────────────────┬───────────────────────┘    │
//!                     │                     │                            │
//!   Client Response   │  ┌─────────┐        ▼                            │
//!   ◀─────────────────┼──│ filter: │◀── upstream response ◀──────────────┼── Upstream
//!                     │  │classify/│                                     │   Server
//!                     │  │fallback │                                     │
//!                     │  └─────────┘                                     │
//!                     │                                                  │
//!                     │  Cross-cutting: config, observability            │
//!                     └──────────────────────────────────────────────────┘
//! ```
//!
//! The interception core (`intercept`) guarantees that every call granted
//! permission by a [`breaker::BreakerGate`] reports exactly one outcome back
//! to it, for any interleaving of value, completion, error, and cancellation
//! signals, while forwarding all signals to the caller untouched. The
//! gateway edge (`gateway`) applies that core per request, classifies
//! upstream status codes against configured failure sets, and dispatches to
//! a fallback target or a translated error when the call is judged failed.

// Core subsystems
pub mod breaker;
pub mod config;
pub mod gateway;
pub mod intercept;
pub mod routing;

// Cross-cutting concerns
pub mod observability;

pub use config::schema::GatewayConfig;
pub use gateway::HttpServer;
