//! C-STORE service: transfer of a single composite SOP instance.

use std::{thread, time::Duration};

use dicom_encoding::transfer_syntax::TransferSyntaxIndex;
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::TransferSyntaxRegistry;
use snafu::OptionExt;

use crate::{
    association::Association,
    pdu::generated::{CStoreRq, CStoreRsp},
};

use super::{
    message::{decode_dataset, send_command, send_command_with_dataset, MessageReader, ReceivedMessage},
    status, NoPresentationContextForAbstractSyntaxSnafu, UnsupportedTransferSyntaxSnafu,
};

/// Options controlling retry behavior for transient (`0xA7xx`) refusals.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// maximum number of additional attempts after a transient refusal
    pub max_retries: u32,
    /// backoff before the first retry, doubled after each subsequent one
    pub initial_backoff: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

/// The outcome of a single C-STORE sub-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOutcome {
    /// the status code of the final C-STORE-RSP received
    pub status: u16,
}

impl StoreOutcome {
    /// Whether the instance was stored without any warning.
    pub fn is_success(&self) -> bool {
        self.status == status::SUCCESS
    }

    /// Whether the instance was stored, but with a warning.
    pub fn is_warning(&self) -> bool {
        status::is_warning(self.status)
    }
}

/// Store a single SOP instance on the association's peer.
///
/// The presentation context is chosen by matching `sop_class_uid` against
/// the association's negotiated abstract syntaxes.
/// A `0xA7xx` refusal is retried with exponential backoff up to
/// `options.max_retries` times; any other status is returned as-is.
pub fn store(
    association: &mut Association,
    message_id: u16,
    sop_class_uid: &str,
    sop_instance_uid: &str,
    dataset: &InMemDicomObject,
    options: StoreOptions,
) -> super::Result<StoreOutcome> {
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

    let mut backoff = options.initial_backoff;
    let mut attempt = 0;

    loop {
        let command = CStoreRq::builder()
            .message_id(message_id)
            .affected_sop_class_uid(sop_class_uid)
            .affected_sop_instance_uid(sop_instance_uid)
            .build();

        send_command_with_dataset(association, pc.id, &command, dataset, ts)?;

        let response = MessageReader::new().next_message(association)?;
        let response_status = response.status()?;

        if status::is_retryable_refusal(response_status) && attempt < options.max_retries {
            attempt += 1;
            thread::sleep(backoff);
            backoff *= 2;
            continue;
        }

        return Ok(StoreOutcome {
            status: response_status,
        });
    }
}

/// Build the C-STORE-RSP answering an incoming C-STORE-RQ,
/// as used by an SCP implementation.
pub fn response_to(request: &ReceivedMessage, status: u16) -> CStoreRsp<'static> {
    CStoreRsp::builder()
        .message_id_being_responded_to(request.message_id)
        .status(status)
        .build()
}

/// Reassemble the data set carried by an incoming C-STORE-RQ.
pub fn dataset_of(
    association: &Association,
    request: &ReceivedMessage,
) -> super::Result<InMemDicomObject> {
    let bytes = request
        .dataset_bytes
        .as_deref()
        .unwrap_or_default();
    decode_dataset(association, request.presentation_context_id, bytes)
}

/// Reply to a C-STORE-RQ with the given status.
pub fn answer(
    association: &mut Association,
    request: &ReceivedMessage,
    status: u16,
) -> super::Result<()> {
    let response = response_to(request, status);
    send_command(association, request.presentation_context_id, &response)
}
