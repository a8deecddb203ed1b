//! IP address allocation and management module.
//!
//! This module derives every link and loopback address of the fabric from
//! topology coordinates and tracks address ownership for uniqueness checks
//! and next-hop resolution.

pub mod allocator;
pub mod registry;

// Re-export commonly used types
pub use allocator::{octet, AddressError, AddressPlan, LinkAddress, LoopbackPrefixes};
pub use registry::{AddressRegistry, InterfaceAssignment, LoopbackAssignment};
