//! PDV demultiplexer: reassembly of DIMSE commands and data sets
//! across P-DATA-TF PDUs, and their fragmented transmission.

use std::collections::HashMap;

use dicom_dictionary_std::tags;
use dicom_encoding::transfer_syntax::TransferSyntaxIndex;
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::{entries, TransferSyntaxRegistry};
use snafu::{OptionExt, ResultExt};

use crate::{
    association::{pdata, Association},
    pdu::{commands::Command, PDataValue, PDataValueType, Pdu},
};

/// A fully reassembled DIMSE message: a command, and its accompanying
/// data set if the command announced one via _Command Data Set Type_.
#[derive(Debug)]
pub struct ReceivedMessage {
    /// the presentation context this message was exchanged over
    pub presentation_context_id: u8,
    /// the decoded command set
    pub command: InMemDicomObject,
    /// the command field value, e.g. C-STORE-RQ, C-FIND-RSP
    pub command_field: u16,
    /// this message's own message ID
    pub message_id: u16,
    /// the message ID this message is responding to, for responses
    pub message_id_being_responded_to: Option<u16>,
    /// the raw bytes of the accompanying data set, still in the
    /// presentation context's negotiated transfer syntax
    pub dataset_bytes: Option<Vec<u8>>,
}

impl ReceivedMessage {
    /// Read the status code carried by this message.
    pub fn status(&self) -> super::Result<u16> {
        read_u16(&self.command, tags::STATUS)
    }
}

/// Decode a reassembled data set using the transfer syntax negotiated
/// for the presentation context it was received on.
pub fn decode_dataset(
    association: &Association,
    presentation_context_id: u8,
    bytes: &[u8],
) -> super::Result<InMemDicomObject> {
    let pc = association
        .presentation_contexts()
        .iter()
        .find(|pc| pc.id == presentation_context_id)
        .context(super::NoSuchPresentationContextSnafu {
            id: presentation_context_id,
        })?;

    let ts = TransferSyntaxRegistry
        .get(&pc.transfer_syntax_uid)
        .context(super::UnsupportedTransferSyntaxSnafu {
            uid: pc.transfer_syntax_uid.clone(),
        })?;

    InMemDicomObject::read_dataset_with_ts(&mut &bytes[..], ts).context(super::DecodeDatasetSnafu)
}

/// Send a DIMSE command with no accompanying data set.
pub fn send_command<C>(
    association: &mut Association,
    presentation_context_id: u8,
    command: &C,
) -> super::Result<()>
where
    C: Command,
{
    let bytes = command.encode(false).context(super::EncodeCommandSnafu)?;
    send_fragmented(
        association,
        presentation_context_id,
        PDataValueType::Command,
        &bytes,
    )
}

/// Send a DIMSE command together with its data set,
/// the latter encoded in the given transfer syntax.
pub fn send_command_with_dataset<C>(
    association: &mut Association,
    presentation_context_id: u8,
    command: &C,
    dataset: &InMemDicomObject,
    ts: &dicom_encoding::TransferSyntax,
) -> super::Result<()>
where
    C: Command,
{
    let bytes = command.encode(true).context(super::EncodeCommandSnafu)?;
    send_fragmented(
        association,
        presentation_context_id,
        PDataValueType::Command,
        &bytes,
    )?;

    let mut writer = association.send_pdata(presentation_context_id);
    dataset
        .write_dataset_with_ts(&mut writer, ts)
        .context(super::EncodeDatasetSnafu)?;
    writer.finish().context(super::IoSnafu)
}

fn send_fragmented(
    association: &mut Association,
    presentation_context_id: u8,
    value_type: PDataValueType,
    bytes: &[u8],
) -> super::Result<()> {
    let max_len = pdata::calculate_max_data_len_single(association.max_pdu_length()) as usize;

    let mut offset = 0;
    loop {
        let end = (offset + max_len).min(bytes.len());
        let is_last = end == bytes.len();
        let data = bytes[offset..end].to_vec();

        association
            .send(&Pdu::PData {
                data: vec![PDataValue {
                    presentation_context_id,
                    value_type: value_type.clone(),
                    is_last,
                    data,
                }],
            })
            .context(super::SendSnafu)?;

        offset = end;
        if is_last {
            return Ok(());
        }
    }
}

#[derive(Default)]
struct ContextBuffer {
    command: Vec<u8>,
    command_done: bool,
    command_obj: Option<InMemDicomObject>,
    needs_dataset: bool,
    dataset: Vec<u8>,
    dataset_done: bool,
}

impl ContextBuffer {
    fn is_complete(&self) -> bool {
        self.command_done && (!self.needs_dataset || self.dataset_done)
    }
}

/// Reassembles DIMSE messages out of the P-DATA-TF PDUs of an association.
///
/// A single reader should be kept around for as long as an association
/// exchanges more than one DIMSE message: fragments belonging to different
/// presentation contexts can interleave on the wire, most notably during
/// C-GET, where C-STORE sub-operations arrive on their own presentation
/// contexts while a C-GET-RSP on the original context is still pending.
#[derive(Default)]
pub struct MessageReader {
    contexts: HashMap<u8, ContextBuffer>,
}

impl MessageReader {
    /// Create a new, empty message reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read PDUs off the association until one presentation context's
    /// command (and data set, if one was announced) is fully reassembled.
    pub fn next_message(&mut self, association: &mut Association) -> super::Result<ReceivedMessage> {
        loop {
            if let Some(&pc_id) = self
                .contexts
                .iter()
                .find(|(_, buf)| buf.is_complete())
                .map(|(id, _)| id)
                .as_ref()
            {
                let buf = self.contexts.remove(&pc_id).expect("key just found");
                return Self::finish(pc_id, buf);
            }

            let pdu = association.receive().context(super::ReceiveSnafu)?;
            let data = match pdu {
                Pdu::PData { data } => data,
                Pdu::AbortRQ { .. } => return super::AbortedSnafu.fail(),
                Pdu::ReleaseRQ | Pdu::ReleaseRP => return super::PeerReleasedSnafu.fail(),
                pdu => return super::UnexpectedPduSnafu { pdu }.fail(),
            };

            for value in data {
                let buf = self
                    .contexts
                    .entry(value.presentation_context_id)
                    .or_default();

                match value.value_type {
                    PDataValueType::Command => {
                        buf.command.extend_from_slice(&value.data);
                        if value.is_last {
                            let command_obj = InMemDicomObject::read_dataset_with_ts(
                                &mut &buf.command[..],
                                &entries::IMPLICIT_VR_LITTLE_ENDIAN.erased(),
                            )
                            .context(super::DecodeCommandSnafu)?;

                            buf.needs_dataset = command_obj
                                .element(tags::COMMAND_DATA_SET_TYPE)
                                .ok()
                                .and_then(|e| e.value().to_int::<u16>().ok())
                                .map(|v| v != 0x0101)
                                .unwrap_or(false);
                            buf.command_obj = Some(command_obj);
                            buf.command_done = true;
                        }
                    }
                    PDataValueType::Data => {
                        buf.dataset.extend_from_slice(&value.data);
                        if value.is_last {
                            buf.dataset_done = true;
                        }
                    }
                }
            }
        }
    }

    fn finish(presentation_context_id: u8, buf: ContextBuffer) -> super::Result<ReceivedMessage> {
        let command = buf
            .command_obj
            .expect("command buffer marked complete without a decoded command");

        let command_field = read_u16(&command, tags::COMMAND_FIELD)?;
        let message_id = read_u16(&command, tags::MESSAGE_ID).unwrap_or(0);
        let message_id_being_responded_to = command
            .element(tags::MESSAGE_ID_BEING_RESPONDED_TO)
            .ok()
            .and_then(|e| e.value().to_int::<u16>().ok());

        Ok(ReceivedMessage {
            presentation_context_id,
            command,
            command_field,
            message_id,
            message_id_being_responded_to,
            dataset_bytes: if buf.needs_dataset {
                Some(buf.dataset)
            } else {
                None
            },
        })
    }
}

fn read_u16(obj: &InMemDicomObject, tag: dicom_core::Tag) -> super::Result<u16> {
    obj.element(tag)
        .ok()
        .context(super::MissingCommandFieldSnafu { tag })?
        .value()
        .to_int::<u16>()
        .context(super::BadCommandFieldSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::generated::CEchoRq;

    #[test]
    fn encode_and_reassemble_roundtrip() {
        let command = CEchoRq::builder()
            .message_id(1)
            .affected_sop_class_uid(dicom_dictionary_std::uids::VERIFICATION)
            .build();

        let bytes = command.encode(false).unwrap();

        let command_obj = InMemDicomObject::read_dataset_with_ts(
            &mut &bytes[..],
            &entries::IMPLICIT_VR_LITTLE_ENDIAN.erased(),
        )
        .unwrap();

        assert_eq!(
            read_u16(&command_obj, tags::COMMAND_FIELD).unwrap(),
            0x0030
        );
        assert_eq!(read_u16(&command_obj, tags::MESSAGE_ID).unwrap(), 1);
        assert_eq!(
            command_obj
                .element(tags::COMMAND_DATA_SET_TYPE)
                .unwrap()
                .value()
                .to_int::<u16>()
                .unwrap(),
            0x0101u16
        );
    }
}
