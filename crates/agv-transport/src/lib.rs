//! `agv-transport`: how codes move between the two engines.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`link`]    | `Link` (Idle → Pending → Acknowledged), `Handshake`           |
//! | [`outbox`]  | `Outbox`: latest-wins send slot with one code in flight       |
//! | [`bulk`]    | `bulk_channel`, `BulkSender`, `BulkReceiver`, `BulkWord`      |
//! | [`relay`]   | `Relay`: per-robot forwarder with the stop-pair fallback      |
//! | [`fabric`]  | `Fabric`, `Lane`, the `Endpoint` trait, `ExchangeStats`       |
//! | [`error`]   | `TransportError`, `TransportResult<T>`                        |
//!
//! # Topology (one lane per robot)
//!
//! ```text
//!             uplink                           uplink
//!  Physical ─────────▶ ┌───────┐ ─────────▶ Coordination
//!  engine   ◀───────── │ Relay │ ◀─────────   engine
//!            downlink  └───────┘  downlink
//!
//!  Coordination ══════ bulk channel (routes, speed tokens) ═════▶ Physical
//! ```
//!
//! Every link carries at most one unacknowledged code.  The bulk channel
//! bypasses the relay and carries no acknowledge.

pub mod bulk;
pub mod error;
pub mod fabric;
pub mod link;
pub mod outbox;
pub mod relay;


pub use bulk::{bulk_channel, BulkFrame, BulkReceiver, BulkSender, BulkWord};
pub use error::{TransportError, TransportResult};
pub use fabric::{Endpoint, ExchangeStats, Fabric, Lane};
pub use link::{Handshake, Link, LinkState};
pub use outbox::Outbox;
pub use relay::Relay;
