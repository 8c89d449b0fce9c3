//! Context Resolver
//!
//! Locates and validates identity within a [`CallContext`], hiding the
//! incoming/outgoing distinction from callers that do not care about it.
//!
//! Every accessor comes in two flavors:
//!
//! - strict (`try_*`): returns a structured [`ResolveError`] on any failure,
//!   wrapped with the slot and field being consulted
//! - lenient: returns the nil identifier on any failure, for call sites
//!   that have already decided an absent identity is acceptable (optional
//!   personalization, never access gating)
//!
//! User-id and player-id resolution are parallel, independent paths: a
//! malformed player id does not affect user-id resolution and vice versa.

use tonic::metadata::MetadataMap;
use uuid::Uuid;

use crate::codec::{Field, IdentityCodec};
use crate::config::MetadataKeys;
use crate::context::{CallContext, Slot};
use crate::error::ResolveError;
use crate::identity::CallerIdentity;

/// Resolves identity fields out of call contexts.
///
/// Stateless apart from the codec configuration; cheap to clone and safe to
/// share across concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    codec: IdentityCodec,
}

impl IdentityResolver {
    pub fn new(codec: IdentityCodec) -> Self {
        Self { codec }
    }

    pub fn with_keys(keys: MetadataKeys) -> Self {
        Self::new(IdentityCodec::new(keys))
    }

    pub fn codec(&self) -> &IdentityCodec {
        &self.codec
    }

    /// Strictly resolve one field from one named slot.
    pub fn try_resolve(
        &self,
        ctx: &CallContext,
        field: Field,
        slot: Slot,
    ) -> Result<Uuid, ResolveError> {
        match ctx.metadata(slot) {
            None => Err(ResolveError::MetadataUnavailable { slot }),
            Some(metadata) => self.try_resolve_in(metadata, field, slot),
        }
    }

    /// Strictly resolve one field from a bare metadata map known to belong
    /// to `slot`. The slot is only used to tag errors; the map itself is
    /// consulted directly.
    pub fn try_resolve_in(
        &self,
        metadata: &MetadataMap,
        field: Field,
        slot: Slot,
    ) -> Result<Uuid, ResolveError> {
        self.codec
            .decode_field(metadata, field)
            .map_err(|source| ResolveError::Field {
                field,
                slot,
                source,
            })
    }

    /// Strictly resolve one field without naming a direction.
    ///
    /// The outgoing slot is consulted first; any outgoing failure falls
    /// back to the incoming slot. A service that both received a call and
    /// staged one must see the identity it is about to send, not the one it
    /// was sent. Exhausting both slots yields
    /// [`ResolveError::ContextUnresolvable`].
    pub fn try_resolve_either(
        &self,
        ctx: &CallContext,
        field: Field,
    ) -> Result<Uuid, ResolveError> {
        self.try_resolve(ctx, field, Slot::Outgoing)
            .or_else(|_| self.try_resolve(ctx, field, Slot::Incoming))
            .map_err(|_| ResolveError::ContextUnresolvable { field })
    }

    /// Lenient counterpart of [`try_resolve`](IdentityResolver::try_resolve).
    pub fn resolve(&self, ctx: &CallContext, field: Field, slot: Slot) -> Uuid {
        self.try_resolve(ctx, field, slot).unwrap_or(Uuid::nil())
    }

    /// Lenient counterpart of
    /// [`try_resolve_either`](IdentityResolver::try_resolve_either).
    pub fn resolve_either(&self, ctx: &CallContext, field: Field) -> Uuid {
        self.try_resolve_either(ctx, field).unwrap_or(Uuid::nil())
    }

    /// Strictly resolve the full identity pair from one slot.
    pub fn try_identity(&self, ctx: &CallContext, slot: Slot) -> Result<CallerIdentity, ResolveError> {
        Ok(CallerIdentity::new(
            self.try_resolve(ctx, Field::User, slot)?,
            self.try_resolve(ctx, Field::Player, slot)?,
        ))
    }

    /// Strictly resolve the full identity pair, direction-agnostic.
    pub fn try_identity_either(&self, ctx: &CallContext) -> Result<CallerIdentity, ResolveError> {
        Ok(CallerIdentity::new(
            self.try_resolve_either(ctx, Field::User)?,
            self.try_resolve_either(ctx, Field::Player)?,
        ))
    }

    // Named accessors mirroring the call sites services actually write.

    pub fn user_id_from_incoming(&self, ctx: &CallContext) -> Uuid {
        self.resolve(ctx, Field::User, Slot::Incoming)
    }

    pub fn user_id_from_outgoing(&self, ctx: &CallContext) -> Uuid {
        self.resolve(ctx, Field::User, Slot::Outgoing)
    }

    pub fn user_id_from_context(&self, ctx: &CallContext) -> Uuid {
        self.resolve_either(ctx, Field::User)
    }

    pub fn try_user_id_from_incoming(&self, ctx: &CallContext) -> Result<Uuid, ResolveError> {
        self.try_resolve(ctx, Field::User, Slot::Incoming)
    }

    pub fn try_user_id_from_outgoing(&self, ctx: &CallContext) -> Result<Uuid, ResolveError> {
        self.try_resolve(ctx, Field::User, Slot::Outgoing)
    }

    pub fn try_user_id_from_context(&self, ctx: &CallContext) -> Result<Uuid, ResolveError> {
        self.try_resolve_either(ctx, Field::User)
    }

    pub fn player_id_from_incoming(&self, ctx: &CallContext) -> Uuid {
        self.resolve(ctx, Field::Player, Slot::Incoming)
    }

    pub fn player_id_from_outgoing(&self, ctx: &CallContext) -> Uuid {
        self.resolve(ctx, Field::Player, Slot::Outgoing)
    }

    pub fn player_id_from_context(&self, ctx: &CallContext) -> Uuid {
        self.resolve_either(ctx, Field::Player)
    }

    pub fn try_player_id_from_incoming(&self, ctx: &CallContext) -> Result<Uuid, ResolveError> {
        self.try_resolve(ctx, Field::Player, Slot::Incoming)
    }

    pub fn try_player_id_from_outgoing(&self, ctx: &CallContext) -> Result<Uuid, ResolveError> {
        self.try_resolve(ctx, Field::Player, Slot::Outgoing)
    }

    pub fn try_player_id_from_context(&self, ctx: &CallContext) -> Result<Uuid, ResolveError> {
        self.try_resolve_either(ctx, Field::Player)
    }
}
