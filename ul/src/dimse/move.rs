//! C-MOVE service: directs the peer to transfer matching composite SOP
//! instances to a third DICOM application entity via C-STORE sub-operations.

use dicom_encoding::transfer_syntax::TransferSyntaxIndex;
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::TransferSyntaxRegistry;
use snafu::OptionExt;

use crate::{
    association::Association,
    pdu::generated::{CMoveCncl, CMoveRq, CMoveRsp},
};

use super::{
    message::{send_command, send_command_with_dataset, MessageReader},
    status, FailedSnafu, NoPresentationContextForAbstractSyntaxSnafu, SubOperationCounts,
    UnsupportedTransferSyntaxSnafu,
};

/// One reported step of an ongoing C-MOVE operation.
#[derive(Debug, Clone, Copy)]
pub struct MoveProgress {
    /// status carried by this response
    pub status: u16,
    /// cumulative sub-operation counters reported with this response
    pub counts: SubOperationCounts,
}

pub struct MoveOperation {
    message_id: u16,
    presentation_context_id: u8,
    reader: MessageReader,
    done: bool,
}

/// Send a C-MOVE-RQ directing the peer to transfer matching instances to
/// `move_destination`, returning a handle to stream the progress reports.
pub fn move_instances(
    association: &mut Association,
    message_id: u16,
    sop_class_uid: &str,
    move_destination: &str,
    identifier: &InMemDicomObject,
) -> super::Result<MoveOperation> {
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

    let command = CMoveRq::builder()
        .message_id(message_id)
        .affected_sop_class_uid(sop_class_uid)
        .move_destination(move_destination)
        .build();

    send_command_with_dataset(association, pc.id, &command, identifier, ts)?;

    Ok(MoveOperation {
        message_id,
        presentation_context_id: pc.id,
        reader: MessageReader::new(),
        done: false,
    })
}

impl MoveOperation {
    /// Read the next progress report, or `None` once the operation has
    /// completed (successfully or with a warning).
    pub fn next(&mut self, association: &mut Association) -> super::Result<Option<MoveProgress>> {
        if self.done {
            return Ok(None);
        }

        let response = self.reader.next_message(association)?;
        let response_status = response.status()?;
        let counts = SubOperationCounts::from_command(&response.command);

        if status::is_pending(response_status) {
            return Ok(Some(MoveProgress {
                status: response_status,
                counts,
            }));
        }

        self.done = true;

        if response_status == status::SUCCESS || status::is_warning(response_status) {
            Ok(Some(MoveProgress {
                status: response_status,
                counts,
            }))
        } else {
            FailedSnafu {
                status: response_status,
            }
            .fail()
        }
    }

    /// Cancel the operation.
    pub fn cancel(&mut self, association: &mut Association) -> super::Result<()> {
        let command = CMoveCncl::builder()
            .message_id_being_responded_to(self.message_id)
            .build();
        send_command(association, self.presentation_context_id, &command)?;
        self.done = true;
        Ok(())
    }
}

/// Report progress for an in-flight C-MOVE-RQ.
pub fn send_pending(
    association: &mut Association,
    presentation_context_id: u8,
    request_message_id: u16,
    counts: SubOperationCounts,
) -> super::Result<()> {
    let response = CMoveRsp::builder()
        .message_id_being_responded_to(request_message_id)
        .status(status::PENDING)
        .number_of_remaining_suboperations(counts.remaining)
        .number_of_completed_suboperations(counts.completed)
        .number_of_failed_suboperations(counts.failed)
        .number_of_warning_suboperations(counts.warning)
        .build();
    send_command(association, presentation_context_id, &response)
}

/// Conclude a C-MOVE-RQ with a terminal status and final sub-operation counts.
pub fn send_final(
    association: &mut Association,
    presentation_context_id: u8,
    request_message_id: u16,
    status: u16,
    counts: SubOperationCounts,
) -> super::Result<()> {
    let response = CMoveRsp::builder()
        .message_id_being_responded_to(request_message_id)
        .status(status)
        .number_of_remaining_suboperations(counts.remaining)
        .number_of_completed_suboperations(counts.completed)
        .number_of_failed_suboperations(counts.failed)
        .number_of_warning_suboperations(counts.warning)
        .build();
    send_command(association, presentation_context_id, &response)
}
