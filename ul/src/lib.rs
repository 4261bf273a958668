//! This crates contains the types and methods needed to interact
//! with DICOM nodes through the upper layer protocol.
//!
//! This crate can be used as a base
//! for finite-state machines and higher-level helpers,
//! enabling the creation of concrete service class users (SCUs)
//! and service class providers (SCPs).
//!
//! - The [`address`] module
//!   provides an abstraction for working with compound addresses
//!   referring to application entities in a network.
//! - The [`pdu`] module
//!   provides data structures representing _protocol data units_,
//!   which are passed around as part of the DICOM network communication support.
//! - The [`association`] module
//!   comprises abstractions for establishing and negotiating associations
//!   between application entities,
//!   via the upper layer protocol by TCP.
//! - The [`dimse`] module
//!   implements the DICOM message service element on top of an
//!   established association: C-ECHO, C-STORE, C-FIND, C-MOVE and C-GET,
//!   for both service class user and provider roles.
//!
//! ## Roles
//! Use [`ScuAssociationOptions`] to request an association as a service
//! class user, and [`ServerAssociationOptions`] to accept one as a service
//! class provider. Both negotiations produce an [`Association`].

pub mod address;
pub mod association;
pub mod dimse;
pub mod pdu;

/// The current implementation class UID generically referring to DICOM-rs.
///
/// Automatically generated as per the standard, part 5, section B.2.
///
/// This UID may change in future versions,
/// even between patch versions.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.156227610253341005307660858504280353500";

/// The current implementation version name generically referring to DICOM-rs.
///
/// This name may change in future versions,
/// even between patch versions.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DICOM-rs 0.8.0";

// re-exports

pub use address::{AeAddr, FullAeAddr};
pub use association::acceptor::ServerAssociationOptions;
pub use association::scu::ScuAssociationOptions;
pub use association::state_machine::{
    Action as AssociationAction, Event as AssociationEvent, State as AssociationState,
    StateMachine as AssociationStateMachine,
};
pub use association::Association;
pub use pdu::read_pdu;
pub use pdu::write_pdu;
pub use pdu::Pdu;
