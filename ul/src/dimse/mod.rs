//! DIMSE message exchange.
//!
//! This module implements the DICOM message service element (DIMSE) on top
//! of an established [`Association`](crate::association::Association):
//! the [`message`] module provides the PDV demultiplexer which fragments and
//! reassembles commands and data sets across P-DATA-TF PDUs, while the
//! remaining modules implement the standard DIMSE services on top of it.

pub mod echo;
pub mod find;
pub mod get;
pub mod r#move;
pub mod message;
pub mod store;

use snafu::Snafu;

use crate::pdu::Pdu;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// failed to send a PDU over the association
    Send { source: crate::association::Error },

    /// failed to receive a PDU from the association
    Receive { source: crate::association::Error },

    /// failed to encode the DIMSE command
    EncodeCommand {
        source: Box<dicom_object::WriteError>,
    },

    /// failed to encode the data set
    EncodeDataset { source: dicom_object::WriteError },

    /// failed to decode the DIMSE command
    DecodeCommand { source: dicom_object::ReadError },

    /// failed to decode the data set
    DecodeDataset { source: dicom_object::ReadError },

    #[snafu(display("missing command element {}", tag))]
    MissingCommandField { tag: dicom_core::Tag },

    /// failed to read a command field's value
    BadCommandField {
        source: dicom_core::value::ConvertValueError,
    },

    #[snafu(display("no presentation context negotiated with id {}", id))]
    NoSuchPresentationContext { id: u8 },

    #[snafu(display("no presentation context negotiated for abstract syntax `{}`", uid))]
    NoPresentationContextForAbstractSyntax { uid: String },

    #[snafu(display("transfer syntax `{}` is not supported", uid))]
    UnsupportedTransferSyntax { uid: String },

    #[snafu(display("unexpected PDU from peer: {:?}", pdu))]
    #[non_exhaustive]
    UnexpectedPdu { pdu: Pdu },

    /// peer aborted the association
    Aborted,

    /// peer released the association while a response was expected
    PeerReleased,

    /// failed to flush pending data set bytes
    Io { source: std::io::Error },

    #[snafu(display("operation failed with status 0x{:04X}", status))]
    Failed { status: u16 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Cumulative sub-operation counters, as carried by every C-MOVE-RSP and
/// C-GET-RSP primitive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubOperationCounts {
    /// number of C-STORE sub-operations yet to be invoked
    pub remaining: u16,
    /// number of C-STORE sub-operations that completed successfully
    pub completed: u16,
    /// number of C-STORE sub-operations that failed
    pub failed: u16,
    /// number of C-STORE sub-operations that completed with a warning
    pub warning: u16,
}

impl SubOperationCounts {
    fn from_command(command: &dicom_object::InMemDicomObject) -> Self {
        let field = |tag| {
            command
                .element(tag)
                .ok()
                .and_then(|e| e.value().to_int::<u16>().ok())
                .unwrap_or(0)
        };
        SubOperationCounts {
            remaining: field(dicom_dictionary_std::tags::NUMBER_OF_REMAINING_SUBOPERATIONS),
            completed: field(dicom_dictionary_std::tags::NUMBER_OF_COMPLETED_SUBOPERATIONS),
            failed: field(dicom_dictionary_std::tags::NUMBER_OF_FAILED_SUBOPERATIONS),
            warning: field(dicom_dictionary_std::tags::NUMBER_OF_WARNING_SUBOPERATIONS),
        }
    }
}

/// Well-known DIMSE status codes relevant to flow control.
pub mod status {
    /// operation completed successfully
    pub const SUCCESS: u16 = 0x0000;
    /// a match or sub-operation is still pending
    pub const PENDING: u16 = 0xFF00;
    /// a match is pending, with optional keys not supported returned
    pub const PENDING_WARNING: u16 = 0xFF01;
    /// C-MOVE destination AE title is unknown to the SCP
    pub const MOVE_DESTINATION_UNKNOWN: u16 = 0xA801;

    /// Check whether a status code belongs to the 0xA7xx "refused" range.
    pub fn is_retryable_refusal(status: u16) -> bool {
        (0xA700..=0xA7FF).contains(&status)
    }

    /// Check whether a status code belongs to the 0xB0xx "warning" range.
    pub fn is_warning(status: u16) -> bool {
        (0xB000..=0xB0FF).contains(&status)
    }

    /// Check whether a status code is a pending match/sub-operation status.
    pub fn is_pending(status: u16) -> bool {
        status == PENDING || status == PENDING_WARNING
    }
}
