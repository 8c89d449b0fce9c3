//! Call Context
//!
//! An immutable carrier for the two metadata slots a call can hold:
//! metadata that arrived with an inbound request, and metadata staged for
//! the next outbound request. A single context may carry either, both, or
//! neither.
//!
//! Attachment never mutates: every builder returns a new context, so
//! concurrent calls sharing a parent context cannot interfere.

use std::fmt;

use tonic::metadata::MetadataMap;
use tonic::Request;

use crate::codec::IdentityCodec;
use crate::identity::CallerIdentity;

/// The two metadata attachment points on a call context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Metadata attached by the transport when a request arrived.
    Incoming,
    /// Metadata staged by this process for the next outbound request.
    Outgoing,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Incoming => f.write_str("incoming"),
            Slot::Outgoing => f.write_str("outgoing"),
        }
    }
}

/// Immutable per-call carrier of incoming and outgoing metadata.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    incoming: Option<MetadataMap>,
    outgoing: Option<MetadataMap>,
}

impl CallContext {
    /// An empty context with neither slot populated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the incoming slot of a server-side request.
    pub fn from_request<T>(request: &Request<T>) -> Self {
        Self::from_incoming_metadata(request.metadata().clone())
    }

    /// Context carrying pre-populated incoming metadata.
    pub fn from_incoming_metadata(metadata: MetadataMap) -> Self {
        Self {
            incoming: Some(metadata),
            outgoing: None,
        }
    }

    /// Context carrying pre-populated outgoing metadata.
    pub fn from_outgoing_metadata(metadata: MetadataMap) -> Self {
        Self {
            incoming: None,
            outgoing: Some(metadata),
        }
    }

    /// The metadata attached to one slot, if any.
    pub fn metadata(&self, slot: Slot) -> Option<&MetadataMap> {
        match slot {
            Slot::Incoming => self.incoming.as_ref(),
            Slot::Outgoing => self.outgoing.as_ref(),
        }
    }

    /// Return a new context with `identity` encoded into the outgoing slot.
    ///
    /// Total: encoding never fails, nil ids are written in canonical nil
    /// form. Unrelated metadata already staged in the slot is preserved;
    /// identity keys are overwritten.
    pub fn with_outgoing_identity(&self, codec: &IdentityCodec, identity: &CallerIdentity) -> Self {
        let mut next = self.clone();
        let mut metadata = next.outgoing.take().unwrap_or_default();
        codec.encode_into(identity, &mut metadata);
        next.outgoing = Some(metadata);
        next
    }

    /// Incoming-slot counterpart of
    /// [`with_outgoing_identity`](CallContext::with_outgoing_identity).
    ///
    /// Real incoming metadata is normally written by the transport; this
    /// exists for in-process call simulation and test harnesses.
    pub fn with_incoming_identity(&self, codec: &IdentityCodec, identity: &CallerIdentity) -> Self {
        let mut next = self.clone();
        let mut metadata = next.incoming.take().unwrap_or_default();
        codec.encode_into(identity, &mut metadata);
        next.incoming = Some(metadata);
        next
    }
}
