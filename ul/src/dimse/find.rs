//! C-FIND service: query for composite SOP instances matching an
//! identifier, streamed back as a sequence of pending matches.

use dicom_encoding::transfer_syntax::TransferSyntaxIndex;
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::TransferSyntaxRegistry;
use snafu::OptionExt;

use crate::{
    association::Association,
    pdu::generated::{CFindCncl, CFindRq, CFindRsp},
};

use super::{
    message::{decode_dataset, send_command, send_command_with_dataset, MessageReader},
    status, FailedSnafu, NoPresentationContextForAbstractSyntaxSnafu,
    UnsupportedTransferSyntaxSnafu,
};

/// An in-progress C-FIND operation, yielding matching identifiers as the
/// peer reports them.
pub struct FindOperation {
    message_id: u16,
    presentation_context_id: u8,
    reader: MessageReader,
    done: bool,
}

/// Send a C-FIND-RQ with the given identifier, returning a handle to
/// stream the matching responses.
pub fn find(
    association: &mut Association,
    message_id: u16,
    sop_class_uid: &str,
    identifier: &InMemDicomObject,
) -> super::Result<FindOperation> {
    let pc = association
        .presentation_context_for(sop_class_uid)
        .context(NoPresentationContextForAbstractSyntaxSnafu {
            uid: sop_class_uid.to_string(),
        })?
        .clone();

    let ts = TransferSyntaxRegistry
        .get(&pc.transfer_syntax_uid)
        .context(UnsupportedTransferSyntaxSnafu {
            uid: pc.transfer_syntax_uid.clone(),
        })?;

    let command = CFindRq::builder()
        .message_id(message_id)
        .affected_sop_class_uid(sop_class_uid)
        .build();

    send_command_with_dataset(association, pc.id, &command, identifier, ts)?;

    Ok(FindOperation {
        message_id,
        presentation_context_id: pc.id,
        reader: MessageReader::new(),
        done: false,
    })
}

impl FindOperation {
    /// Read the next response, returning the matching identifier while the
    /// peer is still reporting pending matches, or `None` once the
    /// operation has completed successfully.
    pub fn next(
        &mut self,
        association: &mut Association,
    ) -> super::Result<Option<InMemDicomObject>> {
        if self.done {
            return Ok(None);
        }

        let response = self.reader.next_message(association)?;
        let response_status = response.status()?;

        if status::is_pending(response_status) {
            let bytes = response.dataset_bytes.as_deref().unwrap_or_default();
            let identifier = decode_dataset(association, self.presentation_context_id, bytes)?;
            return Ok(Some(identifier));
        }

        self.done = true;

        if response_status == status::SUCCESS {
            Ok(None)
        } else {
            FailedSnafu {
                status: response_status,
            }
            .fail()
        }
    }

    /// Cancel the operation, instructing the peer to stop reporting
    /// further matches.
    pub fn cancel(&mut self, association: &mut Association) -> super::Result<()> {
        let command = CFindCncl::builder()
            .message_id_being_responded_to(self.message_id)
            .build();
        send_command(association, self.presentation_context_id, &command)?;
        self.done = true;
        Ok(())
    }
}

/// Build a pending C-FIND-RSP carrying one matched identifier.
pub fn pending_response(request_message_id: u16, warning: bool) -> CFindRsp<'static> {
    CFindRsp::builder()
        .message_id_being_responded_to(request_message_id)
        .status(if warning {
            status::PENDING_WARNING
        } else {
            status::PENDING
        })
        .build()
}

/// Send one pending match for an ongoing C-FIND-RQ.
pub fn send_pending(
    association: &mut Association,
    presentation_context_id: u8,
    request_message_id: u16,
    identifier: &InMemDicomObject,
    ts: &dicom_encoding::TransferSyntax,
) -> super::Result<()> {
    let response = pending_response(request_message_id, false);
    send_command_with_dataset(association, presentation_context_id, &response, identifier, ts)
}

/// Conclude a C-FIND-RQ with a terminal status (success or failure).
pub fn send_final(
    association: &mut Association,
    presentation_context_id: u8,
    request_message_id: u16,
    status: u16,
) -> super::Result<()> {
    let response = CFindRsp::builder()
        .message_id_being_responded_to(request_message_id)
        .status(status)
        .build();
    send_command(association, presentation_context_id, &response)
}
