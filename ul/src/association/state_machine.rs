//! Explicit DICOM upper layer association state machine.
//!
//! Models the 13 states of PS3.8 Table 9-2 (Sta1 through Sta13) and the
//! events that drive transitions between them. The machine is pure: it
//! holds no socket and owns no timer, it only tracks the current state
//! and tells the caller which side effects to perform next.

use snafu::Snafu;

/// One of the thirteen states of the association state machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum State {
    /// Sta1: idle, no association.
    Idle,
    /// Sta2: SCP, transport connection open, awaiting A-ASSOCIATE-RQ.
    AwaitingAssociateRq,
    /// Sta3: SCP, awaiting local accept/reject decision.
    AwaitingLocalAcceptOrReject,
    /// Sta4: SCU, awaiting transport connection to open.
    AwaitingTransportConnection,
    /// Sta5: SCU, awaiting A-ASSOCIATE response.
    AwaitingAssociateResponse,
    /// Sta6: association established, data transfer.
    Established,
    /// Sta7: SCU, awaiting A-RELEASE-RP.
    AwaitingReleaseResponse,
    /// Sta8: SCP, awaiting local release response.
    AwaitingLocalReleaseResponse,
    /// Sta9: release collision, requestor side, awaiting release response.
    ReleaseCollisionRequestorAwaitingResponse,
    /// Sta10: release collision, acceptor side, awaiting local release response.
    ReleaseCollisionAcceptorAwaitingLocalResponse,
    /// Sta11: release collision, requestor side, awaiting release response
    /// to a collision release it already acknowledged.
    ReleaseCollisionRequestorAwaitingRp,
    /// Sta12: release collision, acceptor side, awaiting local release response
    /// after acknowledging the peer's release.
    ReleaseCollisionAcceptorAwaitingLocalResponse2,
    /// Sta13: awaiting transport connection close.
    AwaitingTransportClose,
}

/// An event that may be raised against the state machine.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Event {
    /// A-ASSOCIATE request issued by the local user (SCU side).
    AAssociateRequest,
    /// The transport connection has been confirmed open.
    TransportConnectionConfirm,
    /// An A-ASSOCIATE-AC PDU was received.
    AssociateAcPduReceived,
    /// An A-ASSOCIATE-RJ PDU was received.
    AssociateRjPduReceived,
    /// An A-ASSOCIATE-RQ PDU was received (acceptor side).
    AssociateRqPduReceived,
    /// The local user decided to accept a pending association request.
    LocalAcceptResponse,
    /// The local user decided to reject a pending association request.
    LocalRejectResponse,
    /// The local user has data to send.
    PDataRequest,
    /// A P-DATA-TF PDU was received.
    PDataIndication,
    /// The local user requested a graceful release.
    AReleaseRequest,
    /// An A-RELEASE-RQ PDU was received.
    ReleaseRqPduReceived,
    /// An A-RELEASE-RP PDU was received.
    ReleaseRpPduReceived,
    /// The local user requested an abort.
    AAbortRequest,
    /// An A-ABORT PDU was received.
    AbortPduReceived,
    /// The transport connection was closed.
    TransportConnectionClosed,
    /// The ARTIM timer expired.
    ArtimTimerExpired,
    /// A structurally invalid PDU was received.
    InvalidPdu,
}

/// A side effect that the caller must perform after a transition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Action {
    /// Open a transport connection to the peer.
    OpenTransportConnection,
    /// Send an A-ASSOCIATE-RQ PDU.
    SendAssociateRq,
    /// Send an A-ASSOCIATE-AC PDU.
    SendAssociateAc,
    /// Send an A-ASSOCIATE-RJ PDU.
    SendAssociateRj,
    /// Send a P-DATA-TF PDU.
    SendPData,
    /// Send an A-RELEASE-RQ PDU.
    SendReleaseRq,
    /// Send an A-RELEASE-RP PDU.
    SendReleaseRp,
    /// Send an A-ABORT PDU.
    SendAbort,
    /// Hand a received A-ASSOCIATE-RQ up to the local user for a decision.
    IndicateAssociateRequest,
    /// Hand received P-DATA up to the local user.
    IndicatePData,
    /// Hand a release request up to the local user.
    IndicateReleaseRequest,
    /// Hand an abort notification up to the local user.
    IndicateAbort,
    /// Ask the transport layer to start the ARTIM timer.
    ArtimTimerStartRequested,
    /// Ask the transport layer to stop the ARTIM timer.
    ArtimTimerStopRequested,
    /// Close the transport connection.
    CloseTransport,
}

/// An event raised while the machine was in a state that does not define
/// a transition for it.
#[derive(Debug, Snafu)]
#[snafu(display("invalid transition: event {:?} in state {:?}", event, state))]
pub struct InvalidTransition {
    pub state: State,
    pub event: Event,
}

/// The DICOM upper layer association state machine.
///
/// Owns only the current state; all I/O and timers are the caller's
/// responsibility, driven by the [`Action`]s returned from
/// [`on_event`](Self::on_event).
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: State,
}

impl Default for StateMachine {
    fn default() -> Self {
        StateMachine { state: State::Idle }
    }
}

impl StateMachine {
    /// Create a new state machine in Sta1 (Idle).
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the association is established (Sta6).
    pub fn is_established(&self) -> bool {
        self.state == State::Established
    }

    /// Feed an event to the machine, returning the actions to perform.
    ///
    /// An abort event from any state (other than `Idle`) terminates the
    /// association, moving to Sta13 and scheduling transport close. An
    /// event with no defined transition for the current state returns
    /// [`InvalidTransition`]; the machine aborts to Sta13 unless it had
    /// already reached Sta6, in which case it stays in its current state
    /// so a still-healthy association is not torn down by a single
    /// unrecognized event.
    pub fn on_event(
        &mut self,
        event: Event,
    ) -> Result<Vec<Action>, InvalidTransition> {
        use Action::*;
        use Event::*;
        use State::*;

        // abort/invalid-pdu/transport-closed are effectively global, but
        // their concrete actions still depend on which side we are on.
        if matches!(event, AAbortRequest | AbortPduReceived) && self.state != Idle {
            let actions = match event {
                AAbortRequest => vec![SendAbort, ArtimTimerStopRequested, CloseTransport],
                AbortPduReceived => vec![IndicateAbort, ArtimTimerStopRequested, CloseTransport],
                _ => unreachable!(),
            };
            self.state = AwaitingTransportClose;
            return Ok(actions);
        }

        if event == TransportConnectionClosed {
            self.state = Idle;
            return Ok(vec![]);
        }

        let (next, actions) = match (self.state, &event) {
            (Idle, AAssociateRequest) => (
                AwaitingTransportConnection,
                vec![OpenTransportConnection],
            ),
            (Idle, TransportConnectionConfirm) => (
                AwaitingAssociateRq,
                vec![ArtimTimerStartRequested],
            ),

            (AwaitingTransportConnection, TransportConnectionConfirm) => {
                (AwaitingAssociateResponse, vec![SendAssociateRq])
            }

            (AwaitingAssociateRq, AssociateRqPduReceived) => (
                AwaitingLocalAcceptOrReject,
                vec![ArtimTimerStopRequested, IndicateAssociateRequest],
            ),
            (AwaitingAssociateRq, InvalidPdu) => {
                (AwaitingTransportClose, vec![SendAbort, CloseTransport])
            }

            (AwaitingLocalAcceptOrReject, LocalAcceptResponse) => {
                (Established, vec![SendAssociateAc])
            }
            (AwaitingLocalAcceptOrReject, LocalRejectResponse) => (
                AwaitingTransportClose,
                vec![SendAssociateRj, ArtimTimerStartRequested],
            ),

            (AwaitingAssociateResponse, AssociateAcPduReceived) => (Established, vec![]),
            (AwaitingAssociateResponse, AssociateRjPduReceived) => {
                (Idle, vec![CloseTransport])
            }

            (Established, PDataRequest) => (Established, vec![SendPData]),
            (Established, PDataIndication) => (Established, vec![IndicatePData]),
            (Established, AReleaseRequest) => {
                (AwaitingReleaseResponse, vec![SendReleaseRq])
            }
            (Established, ReleaseRqPduReceived) => (
                AwaitingLocalReleaseResponse,
                vec![IndicateReleaseRequest],
            ),

            (AwaitingReleaseResponse, ReleaseRpPduReceived) => {
                (Idle, vec![CloseTransport])
            }
            // release collision: both sides requested release at once.
            (AwaitingReleaseResponse, ReleaseRqPduReceived) => (
                ReleaseCollisionRequestorAwaitingResponse,
                vec![IndicateReleaseRequest],
            ),

            (AwaitingLocalReleaseResponse, AReleaseRequest) => {
                (Idle, vec![SendReleaseRp, CloseTransport])
            }

            (ReleaseCollisionRequestorAwaitingResponse, AReleaseRequest) => (
                ReleaseCollisionRequestorAwaitingRp,
                vec![SendReleaseRp],
            ),
            (ReleaseCollisionRequestorAwaitingRp, ReleaseRpPduReceived) => {
                (Idle, vec![CloseTransport])
            }

            (ReleaseCollisionAcceptorAwaitingLocalResponse, ReleaseRpPduReceived) => (
                ReleaseCollisionAcceptorAwaitingLocalResponse2,
                vec![],
            ),
            (ReleaseCollisionAcceptorAwaitingLocalResponse2, AReleaseRequest) => {
                (Idle, vec![SendReleaseRp, CloseTransport])
            }

            (state, event) => {
                let event = event.clone();
                if state == Established {
                    // keep a healthy association alive on a stray event
                    return Err(InvalidTransition { state, event });
                }
                self.state = AwaitingTransportClose;
                return Err(InvalidTransition { state, event });
            }
        };

        self.state = next;
        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scu_happy_path() {
        let mut m = StateMachine::new();
        assert_eq!(m.state(), State::Idle);

        let actions = m.on_event(Event::AAssociateRequest).unwrap();
        assert_eq!(actions, vec![Action::OpenTransportConnection]);
        assert_eq!(m.state(), State::AwaitingTransportConnection);

        let actions = m.on_event(Event::TransportConnectionConfirm).unwrap();
        assert_eq!(actions, vec![Action::SendAssociateRq]);
        assert_eq!(m.state(), State::AwaitingAssociateResponse);

        m.on_event(Event::AssociateAcPduReceived).unwrap();
        assert!(m.is_established());

        let actions = m.on_event(Event::AReleaseRequest).unwrap();
        assert_eq!(actions, vec![Action::SendReleaseRq]);
        assert_eq!(m.state(), State::AwaitingReleaseResponse);

        let actions = m.on_event(Event::ReleaseRpPduReceived).unwrap();
        assert_eq!(actions, vec![Action::CloseTransport]);
        assert_eq!(m.state(), State::Idle);
    }

    #[test]
    fn scp_happy_path() {
        let mut m = StateMachine::new();
        m.on_event(Event::TransportConnectionConfirm).unwrap();
        assert_eq!(m.state(), State::AwaitingAssociateRq);

        let actions = m.on_event(Event::AssociateRqPduReceived).unwrap();
        assert_eq!(
            actions,
            vec![Action::ArtimTimerStopRequested, Action::IndicateAssociateRequest]
        );
        assert_eq!(m.state(), State::AwaitingLocalAcceptOrReject);

        let actions = m.on_event(Event::LocalAcceptResponse).unwrap();
        assert_eq!(actions, vec![Action::SendAssociateAc]);
        assert!(m.is_established());

        let actions = m.on_event(Event::ReleaseRqPduReceived).unwrap();
        assert_eq!(actions, vec![Action::IndicateReleaseRequest]);
        assert_eq!(m.state(), State::AwaitingLocalReleaseResponse);

        let actions = m.on_event(Event::AReleaseRequest).unwrap();
        assert_eq!(actions, vec![Action::SendReleaseRp, Action::CloseTransport]);
        assert_eq!(m.state(), State::Idle);
    }

    #[test]
    fn abort_from_established_goes_to_sta13() {
        let mut m = StateMachine::new();
        m.on_event(Event::TransportConnectionConfirm).unwrap();
        m.on_event(Event::AssociateRqPduReceived).unwrap();
        m.on_event(Event::LocalAcceptResponse).unwrap();
        assert!(m.is_established());

        let actions = m.on_event(Event::AbortPduReceived).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::IndicateAbort,
                Action::ArtimTimerStopRequested,
                Action::CloseTransport
            ]
        );
        assert_eq!(m.state(), State::AwaitingTransportClose);
    }

    #[test]
    fn release_collision_requestor_side() {
        let mut m = StateMachine::new();
        m.on_event(Event::AAssociateRequest).unwrap();
        m.on_event(Event::TransportConnectionConfirm).unwrap();
        m.on_event(Event::AssociateAcPduReceived).unwrap();
        m.on_event(Event::AReleaseRequest).unwrap();
        assert_eq!(m.state(), State::AwaitingReleaseResponse);

        // peer released at the same time
        m.on_event(Event::ReleaseRqPduReceived).unwrap();
        assert_eq!(
            m.state(),
            State::ReleaseCollisionRequestorAwaitingResponse
        );

        let actions = m.on_event(Event::AReleaseRequest).unwrap();
        assert_eq!(actions, vec![Action::SendReleaseRp]);
        assert_eq!(m.state(), State::ReleaseCollisionRequestorAwaitingRp);

        let actions = m.on_event(Event::ReleaseRpPduReceived).unwrap();
        assert_eq!(actions, vec![Action::CloseTransport]);
        assert_eq!(m.state(), State::Idle);
    }

    #[test]
    fn invalid_transition_before_established_aborts() {
        let mut m = StateMachine::new();
        let err = m.on_event(Event::PDataIndication).unwrap_err();
        assert_eq!(err.state, State::Idle);
        assert_eq!(m.state(), State::AwaitingTransportClose);
    }

    #[test]
    fn invalid_transition_after_established_keeps_state() {
        let mut m = StateMachine::new();
        m.on_event(Event::TransportConnectionConfirm).unwrap();
        m.on_event(Event::AssociateRqPduReceived).unwrap();
        m.on_event(Event::LocalAcceptResponse).unwrap();
        assert!(m.is_established());

        let err = m.on_event(Event::AssociateRqPduReceived).unwrap_err();
        assert_eq!(err.state, State::Established);
        assert!(m.is_established());
    }
}
