//! DroneCAN protocol core data types
//!
//! This crate provides basic data type definitions used by other canscript crates.
//! Broker users should not depend on this crate directly. Use the `canscript::core` reexport
//! instead.
#![no_std]

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue;

/// Kind of a transfer [1; 4.2]
///
/// Broadcasts are fire-and-forget messages addressed to all nodes. A request is addressed to a
/// single node and expects a response carrying the same data type and transfer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferKind {
    Response = 0,
    Request = 1,
    Broadcast = 2,
}

impl TransferKind {
    pub const fn is_service(self) -> bool {
        match self {
            TransferKind::Response | TransferKind::Request => true,
            TransferKind::Broadcast => false,
        }
    }
}

/// Transfer priority [1; 4.2.1]
///
/// DroneCAN encodes the priority in the 5 most significant bits of the CAN ID, thus lower
/// numerical values are more urgent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(u8);

impl Priority {
    const MAX_VALUE: u8 = 0x1f;

    pub const HIGHEST: Priority = Priority(0);
    pub const HIGH: Priority = Priority(8);
    pub const MEDIUM: Priority = Priority(16);
    pub const LOW: Priority = Priority(24);
    pub const LOWEST: Priority = Priority(Self::MAX_VALUE);

    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX_VALUE {
            Some(Self::from_u8_truncating(value))
        } else {
            None
        }
    }

    pub const fn from_u8_truncating(value: u8) -> Self {
        Self(value & Self::MAX_VALUE)
    }

    pub const fn into_u8(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::HIGHEST
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.into_u8()
    }
}

impl TryFrom<u8> for Priority {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidValue)
    }
}

/// Bus node address
///
/// Zero is reserved for anonymous transfers; regular nodes use 1..=127.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeId(u8);

impl NodeId {
    const MAX_VALUE: u8 = 0x7f;
    pub const MAX: NodeId = NodeId(Self::MAX_VALUE);
    pub const ANONYMOUS: NodeId = NodeId(0);

    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX_VALUE {
            Some(Self::from_u8_truncating(value))
        } else {
            None
        }
    }

    pub const fn from_u8_truncating(value: u8) -> Self {
        Self(value & Self::MAX_VALUE)
    }

    pub const fn into_u8(self) -> u8 {
        self.0
    }

    pub const fn is_anonymous(self) -> bool {
        self.0 == Self::ANONYMOUS.0
    }
}

impl From<NodeId> for u8 {
    fn from(value: NodeId) -> Self {
        value.into_u8()
    }
}

impl From<NodeId> for usize {
    fn from(value: NodeId) -> Self {
        u8::from(value).into()
    }
}

impl TryFrom<u8> for NodeId {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidValue)
    }
}

/// Data type identifier
///
/// Message types use the full 16-bit range, service types the lower 8 bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataTypeId(u16);

impl DataTypeId {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn into_u16(self) -> u16 {
        self.0
    }
}

impl From<u16> for DataTypeId {
    fn from(value: u16) -> Self {
        Self::new(value)
    }
}

impl From<DataTypeId> for u16 {
    fn from(value: DataTypeId) -> Self {
        value.into_u16()
    }
}

/// Data type signature
///
/// Identifies the exact structural encoding of a data type. It seeds the CRC of multi-frame
/// transfers, so both ends must agree on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Signature(u64);

impl Signature {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn into_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for Signature {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Signature> for u64 {
    fn from(value: Signature) -> Self {
        value.into_u64()
    }
}

/// Rolling transfer identifier
///
/// The counter wraps modulo 256. A driver advances it once per submitted transfer, so a
/// response to the last request carries `current.prev()`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferId(u8);

impl TransferId {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn into_u8(self) -> u8 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub const fn prev(self) -> Self {
        Self(self.0.wrapping_sub(1))
    }
}

impl From<u8> for TransferId {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<TransferId> for u8 {
    fn from(value: TransferId) -> Self {
        value.into_u8()
    }
}

/// A set of redundant CAN interfaces a transfer should be sent on
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IfaceMask(u8);

impl IfaceMask {
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn into_bits(self) -> u8 {
        self.0
    }

    /// Mask covering the first `count` interfaces
    pub const fn all(count: u8) -> Self {
        if count >= u8::BITS as u8 {
            Self(u8::MAX)
        } else {
            Self((1u8 << count) - 1)
        }
    }

    pub const fn contains(&self, iface: u8) -> bool {
        iface < u8::BITS as u8 && (self.0 >> iface) & 0x1 != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl Default for IfaceMask {
    fn default() -> Self {
        IfaceMask::NONE
    }
}

impl core::ops::BitOr<IfaceMask> for IfaceMask {
    type Output = Self;
    fn bitor(self, rhs: IfaceMask) -> Self::Output {
        IfaceMask(self.0 | rhs.0)
    }
}

impl core::ops::BitAnd<IfaceMask> for IfaceMask {
    type Output = Self;
    fn bitand(self, rhs: IfaceMask) -> Self::Output {
        IfaceMask(self.0 & rhs.0)
    }
}
