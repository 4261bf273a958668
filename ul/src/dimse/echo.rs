//! C-ECHO service: verifies that an association partner is reachable
//! and responsive, without otherwise affecting it.

use snafu::OptionExt;

use crate::{
    association::Association,
    pdu::generated::{CEchoRq, CEchoRsp},
};

use super::{
    message::{send_command, MessageReader, ReceivedMessage},
    NoSuchPresentationContextSnafu,
};

/// Send a C-ECHO-RQ over the given presentation context
/// and return the status code carried by the single C-ECHO-RSP.
///
/// A status of [`status::SUCCESS`](super::status::SUCCESS) (`0x0000`)
/// indicates that the verification succeeded.
pub fn echo(
    association: &mut Association,
    presentation_context_id: u8,
    message_id: u16,
) -> super::Result<u16> {
    let abstract_syntax_uid = association
        .presentation_contexts()
        .iter()
        .find(|pc| pc.id == presentation_context_id)
        .context(NoSuchPresentationContextSnafu {
            id: presentation_context_id,
        })?
        .abstract_syntax_uid
        .clone();

    let command = CEchoRq::builder()
        .message_id(message_id)
        .affected_sop_class_uid(abstract_syntax_uid.as_str())
        .build();

    send_command(association, presentation_context_id, &command)?;

    let response = MessageReader::new().next_message(association)?;
    response.status()
}

/// Build the C-ECHO-RSP matching an incoming C-ECHO-RQ, as received by an
/// SCP implementation.
pub fn response_to(request: &ReceivedMessage, status: u16) -> CEchoRsp<'static> {
    CEchoRsp::builder()
        .message_id_being_responded_to(request.message_id)
        .status(status)
        .build()
}

/// Reply to a C-ECHO-RQ with the given status, typically
/// [`status::SUCCESS`](super::status::SUCCESS).
pub fn answer(
    association: &mut Association,
    request: &ReceivedMessage,
    status: u16,
) -> super::Result<()> {
    let response = response_to(request, status);
    send_command(association, request.presentation_context_id, &response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::commands::Command;

    #[test]
    fn echo_rsp_carries_the_request_message_id() {
        let rsp = CEchoRsp::builder()
            .message_id_being_responded_to(42)
            .status(0x0000)
            .build();
        assert_eq!(rsp.command_field(), 0x8030);
    }
}
