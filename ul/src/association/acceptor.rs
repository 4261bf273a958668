//! Association acceptor module
//!
//! The module provides an abstraction for a DICOM association
//! in which this application entity listens to incoming association requests.
//! See [`ServerAssociationOptions`] for details and examples on how to
//! accept associations over an already open TCP connection.
use std::{borrow::Cow, net::TcpStream};

use snafu::{ensure, ResultExt, Snafu};

use crate::pdu::{
    reader::read_pdu, writer::write_pdu, AbortRQSource, AssociationAC, AssociationRJ,
    AssociationRJResult, AssociationRJServiceUserReason, AssociationRJSource, AssociationRQ, Pdu,
    PresentationContextResult, PresentationContextResultReason, UserVariableItem,
};

use super::{uid::trim_uid, Association, NegotiatedPresentationContext, ServiceClassRole};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// no abstract syntaxes configured for acceptance
    MissingAbstractSyntax,

    /// failed to receive association request
    Receive { source: crate::pdu::reader::Error },

    /// failed to send association response
    Send { source: crate::pdu::writer::Error },

    #[snafu(display("unexpected request from SCU `{:?}`", pdu))]
    #[non_exhaustive]
    UnexpectedRequest { pdu: Pdu },

    #[snafu(display("unknown request from SCU `{:?}`", pdu))]
    #[non_exhaustive]
    UnknownRequest { pdu: Pdu },

    /// the requesting node was rejected: {reason:?}
    Rejected {
        reason: AssociationRJServiceUserReason,
    },

    /// no presentation context was accepted
    NoAcceptedPresentationContexts,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Common interface for application entity access control policies.
///
/// Existing implementations include [`AcceptAny`] and [`AcceptCalledAeTitle`],
/// but users are free to implement their own.
pub trait AccessControl {
    /// Decide whether to accept an incoming association request,
    /// based on the calling and called application entity titles.
    fn check_access(
        &self,
        this_ae_title: &str,
        calling_ae_title: &str,
        called_ae_title: &str,
    ) -> std::result::Result<(), AssociationRJServiceUserReason>;
}

/// An access control rule that accepts any incoming association request.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct AcceptAny;

impl AccessControl for AcceptAny {
    fn check_access(
        &self,
        _this_ae_title: &str,
        _calling_ae_title: &str,
        _called_ae_title: &str,
    ) -> std::result::Result<(), AssociationRJServiceUserReason> {
        Ok(())
    }
}

/// An access control rule that accepts association requests
/// whose called AE title matches this node's AE title.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct AcceptCalledAeTitle;

impl AccessControl for AcceptCalledAeTitle {
    fn check_access(
        &self,
        this_ae_title: &str,
        _calling_ae_title: &str,
        called_ae_title: &str,
    ) -> std::result::Result<(), AssociationRJServiceUserReason> {
        if this_ae_title == called_ae_title {
            Ok(())
        } else {
            Err(AssociationRJServiceUserReason::CalledAETitleNotRecognized)
        }
    }
}

/// A DICOM association builder for an acceptor node,
/// taking the role of a service class provider (SCP).
///
/// Unlike [`ScuAssociationOptions`](crate::association::scu::ScuAssociationOptions),
/// a value of this type can be reused to negotiate multiple connections:
/// call [`establish`](Self::establish) once per accepted TCP stream.
///
/// # Example
///
/// ```no_run
/// # use dicom_ul::association::acceptor::ServerAssociationOptions;
/// # fn run(socket: std::net::TcpStream) -> Result<(), Box<dyn std::error::Error>> {
/// let association = ServerAssociationOptions::new()
///     .ae_title("THIS-SCP")
///     .with_abstract_syntax("1.2.840.10008.1.1")
///     .establish(socket)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ServerAssociationOptions<'a, A> {
    ae_access_control: A,
    ae_title: Cow<'a, str>,
    application_context_name: Cow<'a, str>,
    abstract_syntax_uids: Vec<Cow<'a, str>>,
    transfer_syntax_uids: Vec<Cow<'a, str>>,
    protocol_version: u16,
    max_pdu_length: u32,
    promiscuous: bool,
}

impl Default for ServerAssociationOptions<'_, AcceptAny> {
    fn default() -> Self {
        ServerAssociationOptions {
            ae_access_control: AcceptAny,
            ae_title: "THIS-SCP".into(),
            application_context_name: "1.2.840.10008.3.1.1.1".into(),
            abstract_syntax_uids: Vec::new(),
            transfer_syntax_uids: Vec::new(),
            protocol_version: 1,
            max_pdu_length: crate::pdu::reader::DEFAULT_MAX_PDU,
            promiscuous: false,
        }
    }
}

impl ServerAssociationOptions<'_, AcceptAny> {
    /// Create a new set of options for accepting associations.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a, A> ServerAssociationOptions<'a, A>
where
    A: AccessControl,
{
    /// Accept any incoming association regardless of AE titles.
    ///
    /// This is the default policy.
    pub fn accept_any(self) -> ServerAssociationOptions<'a, AcceptAny> {
        self.ae_access_control(AcceptAny)
    }

    /// Accept an association only if the called AE title
    /// matches this node's AE title.
    pub fn accept_called_ae_title(self) -> ServerAssociationOptions<'a, AcceptCalledAeTitle> {
        self.ae_access_control(AcceptCalledAeTitle)
    }

    /// Set a custom access control policy.
    pub fn ae_access_control<P>(self, access_control: P) -> ServerAssociationOptions<'a, P>
    where
        P: AccessControl,
    {
        let ServerAssociationOptions {
            ae_title,
            application_context_name,
            abstract_syntax_uids,
            transfer_syntax_uids,
            protocol_version,
            max_pdu_length,
            promiscuous,
            ae_access_control: _,
        } = self;

        ServerAssociationOptions {
            ae_access_control: access_control,
            ae_title,
            application_context_name,
            abstract_syntax_uids,
            transfer_syntax_uids,
            protocol_version,
            max_pdu_length,
            promiscuous,
        }
    }

    /// Define the application entity title referring to this DICOM node.
    ///
    /// The default is `THIS-SCP`.
    pub fn ae_title<T>(mut self, ae_title: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        self.ae_title = ae_title.into();
        self
    }

    /// Accept this abstract syntax when proposed by the requesting node.
    pub fn with_abstract_syntax<T>(mut self, abstract_syntax_uid: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        self.abstract_syntax_uids.push(abstract_syntax_uid.into());
        self
    }

    /// Accept this transfer syntax when proposed in a presentation context.
    ///
    /// If none are given, every transfer syntax known to
    /// the main transfer syntax registry is accepted.
    pub fn with_transfer_syntax<T>(mut self, transfer_syntax_uid: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        self.transfer_syntax_uids.push(transfer_syntax_uid.into());
        self
    }

    /// Override the maximum PDU length announced to the requesting node.
    pub fn max_pdu_length(mut self, value: u32) -> Self {
        self.max_pdu_length = value;
        self
    }

    /// Accept abstract syntaxes not explicitly configured via
    /// [`with_abstract_syntax`](Self::with_abstract_syntax).
    pub fn promiscuous(mut self, promiscuous: bool) -> Self {
        self.promiscuous = promiscuous;
        self
    }

    fn choose_ts<I, T>(&self, it: I) -> Option<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        use dicom_encoding::transfer_syntax::TransferSyntaxIndex;
        use dicom_transfer_syntax_registry::TransferSyntaxRegistry;

        it.into_iter().find_map(|ts| {
            let ts = ts.as_ref();
            if !self.transfer_syntax_uids.is_empty()
                && !self.transfer_syntax_uids.iter().any(|t| t.as_ref() == ts)
            {
                return None;
            }
            TransferSyntaxRegistry
                .get(ts)
                .filter(|entry| !entry.unsupported())
                .map(|_| ts.to_string())
        })
    }

    /// Read an association request from the given TCP stream,
    /// negotiate presentation contexts and respond,
    /// producing an established [`Association`] on success.
    ///
    /// On rejection or abort the appropriate PDU is sent back
    /// to the requesting node before the error is returned.
    pub fn establish(&self, mut socket: TcpStream) -> Result<Association> {
        ensure!(
            !self.abstract_syntax_uids.is_empty() || self.promiscuous,
            MissingAbstractSyntaxSnafu
        );

        let msg = read_pdu(&mut socket, self.max_pdu_length, true).context(ReceiveSnafu)?;

        let request = match msg {
            Pdu::AssociationRQ(rq) => rq,
            pdu @ Pdu::AbortRQ { .. }
            | pdu @ Pdu::ReleaseRQ
            | pdu @ Pdu::ReleaseRP
            | pdu @ Pdu::PData { .. }
            | pdu @ Pdu::AssociationAC(_)
            | pdu @ Pdu::AssociationRJ(_) => return UnexpectedRequestSnafu { pdu }.fail(),
            pdu @ Pdu::Unknown { .. } => return UnknownRequestSnafu { pdu }.fail(),
        };

        match self.negotiate(request) {
            Ok((pdu, association)) => {
                write_pdu(&mut socket, &pdu).context(SendSnafu)?;
                Ok(Association {
                    service_class_type: ServiceClassRole::Scp,
                    presentation_contexts: association,
                    max_pdu_length: self.max_pdu_length,
                    socket,
                })
            }
            Err((pdu, err)) => {
                write_pdu(&mut socket, &pdu).context(SendSnafu)?;
                Err(err)
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn negotiate(
        &self,
        request: AssociationRQ,
    ) -> std::result::Result<(Pdu, Vec<NegotiatedPresentationContext>), (Pdu, Error)> {
        let AssociationRQ {
            protocol_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            ..
        } = request;

        if protocol_version != self.protocol_version {
            let rj = AssociationRJ {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::NoReasonGiven,
                ),
            };
            return Err((
                Pdu::AssociationRJ(rj),
                RejectedSnafu {
                    reason: AssociationRJServiceUserReason::NoReasonGiven,
                }
                .build(),
            ));
        }

        if application_context_name != self.application_context_name {
            let rj = AssociationRJ {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::ApplicationContextNameNotSupported,
                ),
            };
            return Err((
                Pdu::AssociationRJ(rj),
                RejectedSnafu {
                    reason: AssociationRJServiceUserReason::ApplicationContextNameNotSupported,
                }
                .build(),
            ));
        }

        if let Err(reason) =
            self.ae_access_control
                .check_access(&self.ae_title, &calling_ae_title, &called_ae_title)
        {
            let rj = AssociationRJ {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceUser(reason.clone()),
            };
            return Err((Pdu::AssociationRJ(rj), RejectedSnafu { reason }.build()));
        }

        let mut negotiated = Vec::with_capacity(presentation_contexts.len());
        let mut results = Vec::with_capacity(presentation_contexts.len());

        for pc in presentation_contexts {
            let abstract_syntax = trim_uid(Cow::from(pc.abstract_syntax)).into_owned();
            if !self.promiscuous
                && !self
                    .abstract_syntax_uids
                    .iter()
                    .any(|a| a.as_ref() == abstract_syntax.as_str())
            {
                results.push(PresentationContextResult {
                    id: pc.id,
                    reason: PresentationContextResultReason::AbstractSyntaxNotSupported,
                    transfer_syntax: "1.2.840.10008.1.2".to_string(),
                });
                continue;
            }

            match self.choose_ts(&pc.transfer_syntaxes) {
                Some(transfer_syntax) => {
                    negotiated.push(NegotiatedPresentationContext {
                        id: pc.id,
                        abstract_syntax_uid: abstract_syntax,
                        transfer_syntax_uid: transfer_syntax.clone(),
                    });
                    results.push(PresentationContextResult {
                        id: pc.id,
                        reason: PresentationContextResultReason::Acceptance,
                        transfer_syntax,
                    });
                }
                None => {
                    results.push(PresentationContextResult {
                        id: pc.id,
                        reason: PresentationContextResultReason::TransferSyntaxesNotSupported,
                        transfer_syntax: "1.2.840.10008.1.2".to_string(),
                    });
                }
            }
        }

        if negotiated.is_empty() {
            let rj = AssociationRJ {
                result: AssociationRJResult::Permanent,
                source: AssociationRJSource::ServiceUser(
                    AssociationRJServiceUserReason::NoReasonGiven,
                ),
            };
            return Err((
                Pdu::AssociationRJ(rj),
                NoAcceptedPresentationContextsSnafu.build(),
            ));
        }

        let ac = AssociationAC {
            protocol_version: self.protocol_version,
            application_context_name,
            presentation_contexts: results,
            user_variables: vec![
                UserVariableItem::MaxLength(self.max_pdu_length),
                UserVariableItem::ImplementationClassUID(
                    crate::IMPLEMENTATION_CLASS_UID.to_string(),
                ),
                UserVariableItem::ImplementationVersionName(
                    crate::IMPLEMENTATION_VERSION_NAME.to_string(),
                ),
            ],
        };

        Ok((Pdu::AssociationAC(ac), negotiated))
    }
}

/// Reject and close the connection by sending an A-ABORT PDU,
/// used when a request cannot even be parsed as an association request.
pub fn abort(mut socket: TcpStream, source: AbortRQSource) -> Result<()> {
    write_pdu(&mut socket, &Pdu::AbortRQ { source }).context(SendSnafu)
}
