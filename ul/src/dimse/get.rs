//! C-GET service: composite SOP instance retrieval over the same
//! association, interleaving C-STORE sub-operations pushed by the peer.

use dicom_encoding::transfer_syntax::TransferSyntaxIndex;
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::TransferSyntaxRegistry;
use snafu::OptionExt;

use crate::{
    association::Association,
    pdu::generated::{CGetCncl, CGetRq, CGetRsp, CStoreRsp},
};

use super::{
    message::{decode_dataset, send_command, send_command_with_dataset, MessageReader},
    status, store, FailedSnafu, NoPresentationContextForAbstractSyntaxSnafu, SubOperationCounts,
    UnsupportedTransferSyntaxSnafu,
};

/// How an in-progress C-GET operation should treat sub-operations that
/// arrive after cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationMode {
    /// refuse any C-STORE sub-operation still arriving after cancellation
    RejectInFlight,
    /// let C-STORE sub-operations already under way complete
    CompleteInFlight,
}

/// A step reported while draining a C-GET operation.
#[derive(Debug)]
pub enum GetEvent {
    /// the peer reports sub-operation progress
    Progress {
        status: u16,
        counts: SubOperationCounts,
    },
    /// the peer is pushing a sub-operation instance to be stored locally;
    /// reply with [`GetOperation::answer_store`] once it has been handled
    Store {
        message_id: u16,
        presentation_context_id: u8,
        sop_class_uid: String,
        sop_instance_uid: String,
        dataset: InMemDicomObject,
    },
}

pub struct GetOperation {
    message_id: u16,
    presentation_context_id: u8,
    reader: MessageReader,
    done: bool,
    cancelled: bool,
    cancellation_mode: CancellationMode,
}

/// Send a C-GET-RQ, returning a handle to drain both progress reports and
/// the interleaved C-STORE sub-operations that carry the retrieved
/// instances.
pub fn get(
    association: &mut Association,
    message_id: u16,
    sop_class_uid: &str,
    identifier: &InMemDicomObject,
) -> super::Result<GetOperation> {
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

    let command = CGetRq::builder()
        .message_id(message_id)
        .affected_sop_class_uid(sop_class_uid)
        .build();

    send_command_with_dataset(association, pc.id, &command, identifier, ts)?;

    Ok(GetOperation {
        message_id,
        presentation_context_id: pc.id,
        reader: MessageReader::new(),
        done: false,
        cancelled: false,
        cancellation_mode: CancellationMode::CompleteInFlight,
    })
}

impl GetOperation {
    /// Read the next event off the association.
    pub fn next(&mut self, association: &mut Association) -> super::Result<Option<GetEvent>> {
        if self.done {
            return Ok(None);
        }

        let response = self.reader.next_message(association)?;

        if response.command_field == 0x0001 {
            if self.cancelled && self.cancellation_mode == CancellationMode::RejectInFlight {
                store::answer(association, &response, 0xA702)?;
                return self.next(association);
            }

            let sop_class_uid = str_field(
                &response.command,
                dicom_dictionary_std::tags::AFFECTED_SOP_CLASS_UID,
            );
            let sop_instance_uid = str_field(
                &response.command,
                dicom_dictionary_std::tags::AFFECTED_SOP_INSTANCE_UID,
            );
            let bytes = response.dataset_bytes.as_deref().unwrap_or_default();
            let dataset = decode_dataset(association, response.presentation_context_id, bytes)?;

            return Ok(Some(GetEvent::Store {
                message_id: response.message_id,
                presentation_context_id: response.presentation_context_id,
                sop_class_uid,
                sop_instance_uid,
                dataset,
            }));
        }

        let response_status = response.status()?;
        let counts = SubOperationCounts::from_command(&response.command);

        if status::is_pending(response_status) {
            return Ok(Some(GetEvent::Progress {
                status: response_status,
                counts,
            }));
        }

        self.done = true;

        if response_status == status::SUCCESS || status::is_warning(response_status) {
            Ok(Some(GetEvent::Progress {
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

    /// Acknowledge a pushed sub-operation instance, as requested by a
    /// [`GetEvent::Store`] yielded from [`next`](Self::next).
    pub fn answer_store(
        &self,
        association: &mut Association,
        presentation_context_id: u8,
        message_id_being_responded_to: u16,
        status: u16,
    ) -> super::Result<()> {
        let response = CStoreRsp::builder()
            .message_id_being_responded_to(message_id_being_responded_to)
            .status(status)
            .build();
        send_command(association, presentation_context_id, &response)
    }

    /// Cancel the operation.
    pub fn cancel(
        &mut self,
        association: &mut Association,
        mode: CancellationMode,
    ) -> super::Result<()> {
        let command = CGetCncl::builder()
            .message_id_being_responded_to(self.message_id)
            .build();
        send_command(association, self.presentation_context_id, &command)?;
        self.cancelled = true;
        self.cancellation_mode = mode;
        Ok(())
    }
}

fn str_field(command: &InMemDicomObject, tag: dicom_core::Tag) -> String {
    command
        .element(tag)
        .ok()
        .and_then(|e| e.value().to_str().ok())
        .map(|s| s.into_owned())
        .unwrap_or_default()
}
