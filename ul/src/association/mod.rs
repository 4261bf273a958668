//! DICOM association module
//!
//! This module contains utilities for establishing associations
//! between DICOM nodes via TCP/IP.

use std::net::TcpStream;

use snafu::{ResultExt, Snafu};

use crate::pdu::{reader::read_pdu, writer::write_pdu, Pdu};

pub mod acceptor;
pub mod pdata;
pub mod scp;
pub mod scu;
pub mod state_machine;
pub(crate) mod uid;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// failed to send PDU message
    Send { source: crate::pdu::writer::Error },

    /// failed to receive PDU message
    Receive { source: crate::pdu::reader::Error },

    #[snafu(display("unexpected response `{:?}`", pdu))]
    #[non_exhaustive]
    UnexpectedResponse {
        /// the PDU obtained from the other node
        pdu: Pdu,
    },

    #[snafu(display("unknown response  `{:?}`", pdu))]
    #[non_exhaustive]
    UnknownResponse {
        /// the PDU obtained from the other node, of variant Unknown
        pdu: Pdu,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A service class user or a provider.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ServiceClassRole {
    /// Service Class User
    Scu,
    /// Service Class Provider
    Scp,
}

/// One presentation context accepted as part of an association negotiation,
/// pairing a presentation context identifier with the abstract and transfer
/// syntax UIDs agreed upon for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedPresentationContext {
    /// The identifier of the accorded presentation context
    pub id: u8,
    /// The accorded abstract syntax UID
    pub abstract_syntax_uid: String,
    /// The accorded transfer syntax UID
    pub transfer_syntax_uid: String,
}

#[derive(Debug)]
pub struct Association {
    service_class_type: ServiceClassRole,
    /// The presentation contexts accepted for this association,
    /// in the order presented by the acceptor.
    presentation_contexts: Vec<NegotiatedPresentationContext>,
    /// The maximum PDU length
    max_pdu_length: u32,
    /// The TCP stream to the other DICOM node
    socket: TcpStream,
}

impl Association {
    /// Retrieve the identifier of the primary negotiated presentation context.
    ///
    /// When more than one presentation context was negotiated
    /// (as is common for C-GET, which also needs a Storage SOP class context),
    /// use [`presentation_contexts`][Self::presentation_contexts] instead.
    pub fn presentation_context_id(&self) -> u8 {
        self.presentation_contexts[0].id
    }

    /// Retrieve the negotiated abstract syntax UID of the primary presentation context.
    pub fn abstract_syntax_uid(&self) -> &str {
        &self.presentation_contexts[0].abstract_syntax_uid
    }

    /// Retrieve the negotiated transfer syntax UID of the primary presentation context.
    pub fn transfer_syntax_uid(&self) -> &str {
        &self.presentation_contexts[0].transfer_syntax_uid
    }

    /// Retrieve all presentation contexts negotiated for this association.
    pub fn presentation_contexts(&self) -> &[NegotiatedPresentationContext] {
        &self.presentation_contexts
    }

    /// Find the negotiated presentation context matching the given abstract syntax UID.
    pub fn presentation_context_for(
        &self,
        abstract_syntax_uid: &str,
    ) -> Option<&NegotiatedPresentationContext> {
        self.presentation_contexts
            .iter()
            .find(|pc| pc.abstract_syntax_uid == abstract_syntax_uid)
    }

    /// Retrieve the negotiated maximum PDU length.
    pub fn max_pdu_length(&self) -> u32 {
        self.max_pdu_length
    }

    /// Send a PDU message to the other intervenient.
    pub fn send(&mut self, msg: &Pdu) -> Result<()> {
        write_pdu(&mut self.socket, &msg).context(Send)
    }

    /// Obtain a writer for sending a dataset as one or more P-DATA-TF PDUs,
    /// fragmented to fit the negotiated maximum PDU length.
    pub fn send_pdata(&mut self, presentation_context_id: u8) -> pdata::PDataWriter<&mut TcpStream> {
        pdata::PDataWriter::new(&mut self.socket, presentation_context_id, self.max_pdu_length)
    }

    /// Read a PDU message from the other intervenient.
    pub fn receive(&mut self) -> Result<Pdu> {
        read_pdu(&mut self.socket, self.max_pdu_length, true).context(Receive)
    }

    /// Gracefully release the association.
    pub fn release(&mut self) -> Result<()> {
        write_pdu(&mut self.socket, &Pdu::ReleaseRQ).context(Send)?;

        let pdu = read_pdu(&mut self.socket, self.max_pdu_length, true).context(Receive)?;

        match pdu {
            Pdu::ReleaseRP => {}
            pdu @ Pdu::AbortRQ { .. }
            | pdu @ Pdu::AssociationAC(..)
            | pdu @ Pdu::AssociationRJ(..)
            | pdu @ Pdu::AssociationRQ(..)
            | pdu @ Pdu::PData { .. }
            | pdu @ Pdu::ReleaseRQ => return UnexpectedResponse { pdu }.fail(),
            pdu @ Pdu::Unknown { .. } => return UnknownResponse { pdu }.fail(),
        }

        let _ = self.socket.shutdown(std::net::Shutdown::Both);
        Ok(())
    }
}

impl Drop for Association {
    fn drop(&mut self) {
        if self.service_class_type == ServiceClassRole::Scu {
            let _ = self.release();
        }
    }
}
