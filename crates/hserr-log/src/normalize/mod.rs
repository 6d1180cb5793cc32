//! Shared value grammars used by several builders.
//!
//! - [`ByteSize`] - sizes in any base-1024 unit, canonicalized to bytes
//! - [`HexAddress`] - addresses, canonicalized to lowercase `0x` hex
//! - [`SignalDescriptor`] - POSIX and Windows signals in one model
//! - [`OsFingerprint`] / [`Arch`] - operating system and CPU identity
//! - [`Device`] - storage class of mapped files

pub mod address;
pub mod device;
pub mod os;
pub mod signal;
pub mod size;

pub use address::HexAddress;
pub use device::Device;
pub use os::{Arch, OsFamily, OsFingerprint, OsVendor};
pub use signal::{MemoryAccess, Platform, Signal, SignalCode, SignalDescriptor};
pub use size::{ByteSize, Limit, LimitValue, SizeUnit};
