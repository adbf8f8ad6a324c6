//! canscript driver interface
//!
//! The crate provides an interface between a DroneCAN protocol driver and the canscript broker.
//! Limited scope facilitates compatibility across versions.
//! Driver crates should depend on this crate. Broker users should depend on the `canscript`
//! crate instead.
//!
//! The interface has two directions:
//! * [`interface::Interface`] is implemented by the driver. The broker submits outbound
//!   broadcasts and requests through it, synchronously, from the scripting context.
//! * Inbound transfers are pushed by the driver into the broker's receive port from the
//!   bus-processing context. The port lives in the `canscript` crate because it needs the
//!   broker internals; this crate only defines the [`transfer::RxTransfer`] it consumes.
//!
//! The driver owns (de)segmentation, CRC and arbitration. The broker deals with whole
//! transfers only.

#![no_std]

pub mod interface;
pub mod transfer;

pub mod time {
    pub use embassy_time::Duration;
}
