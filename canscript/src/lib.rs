//! # canscript
//!
//! This library connects an embedded scripting engine to a DroneCAN \[1\] bus. Scripts send
//! broadcasts and requests, subscribe to broadcasts and collect responses through handles.
//! The bus driver feeds inbound transfers from its own, higher-priority context.
//!
//! The library is `no_std` and allocates through `alloc` with fallible allocation only. It
//! deals with whole transfers; (de)segmentation, CRC and arbitration belong to the driver.
//!
//! ## Architecture
//!
//! ```text
//!   scripting context                     bus-processing context
//!
//! ┌──────────┐  broadcast ┌───────────┐            ┌────────┐
//! │ Handle 1 ├───request─►│ Interface │            │ RxPort │
//! └────┬─────┘            └───────────┘            └───┬────┘
//!      │ subscribe                                     │ push
//!      ▼                                               ▼
//! ┌──────────────────── Broker ───────────────────────────────┐
//! │ bus 0..3: driver lock ─► Registry (kind, data type)─► Key │
//! │                                                       │   │
//! │ handle lock ─► HandleTable ◄──────────────────────────┘   │
//! │                  └ slot: transfer id, canfd, Subscription │
//! │                                  └ Mailbox (8 payloads)   │
//! │                  cleanup list ───► every Subscription     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//! Components:
//! * _Broker_ owns the bus slots, the handle table and both lock levels. It is shared by
//!   reference between the scripting and bus-processing contexts.
//! * _Handle_ is the scripting-side object. It sends transfers through the bus
//!   [`Interface`](interface::Interface) and owns at most one subscription. Dropping a handle
//!   destroys its subscription and releases its slot.
//! * _Subscription_ is an interest in broadcasts of a data type, or in the response to the
//!   last request of its handle. It owns a mailbox of up to [`MAX_PAYLOADS`](config::MAX_PAYLOADS)
//!   payloads; newer payloads are dropped while it is full.
//! * _Registry_ maps a transfer kind and data type to the interested subscriptions of a bus.
//! * _RxPort_ is the driver's entry point for inbound transfers.
//! * _Cleanup list_ links every live subscription, so [`Broker::destroy_all`] can tear them
//!   down in one pass.
//!
//! ## Concurrency model
//!
//! There are two lock levels, both blocking mutexes held for short, bounded sections:
//! * a _driver lock_ per bus guards the registry of that bus;
//! * a single _handle lock_ guards the handle table, every subscription and every mailbox.
//!
//! The driver lock is always taken before the handle lock. The order is enforced by a single
//! acquisition helper; no other code path takes both. The mutex implementation is chosen by
//! the user:
//! * _CriticalSectionRawMutex_ allows the scripting context and the bus-processing context to
//!   run at different interrupt levels.
//! * _ThreadModeRawMutex_ or _NoopRawMutex_ fit systems where both run in thread mode.
//!
//! The driver [`Interface`](interface::Interface) is called with both locks held. It must
//! queue the transfer and return without calling back into the broker.
//!
//! ## Response matching
//!
//! A handle keeps a rolling transfer identifier that the driver advances on every send. A
//! response is accepted only from the node the request was sent to, and only if it carries the
//! identifier that preceded the handle's current one. Sending anything else on the handle in
//! between invalidates the pending request.
//!
//! ## Limitations
//!
//! * Unanswered requests are not timed out; their subscription lives until replaced.
//! * Dropped transfers are only reported through [`Broker::stats`].
//!
//! # References:
//!
//! * \[1\] DroneCAN Specification
//!   <https://dronecan.github.io/Specification>
#![no_std]

extern crate alloc;

pub use canscript_core as core;
pub use canscript_driver::{interface, time, transfer};

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod broker;
pub mod config;
pub mod dispatch;
pub mod handle;
mod lifecycle;
mod locks;
pub mod mailbox;
pub mod param;
mod registry;
pub mod stats;
pub mod subscription;
mod table;
mod utils;

pub use broker::{AttachError, Broker, HandleError};
pub use dispatch::RxPort;
pub use handle::Handle;
pub use mailbox::Message;
pub use stats::Stats;
