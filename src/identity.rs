//! Caller Identity Value
//!
//! The identity pair that travels with every call: the account-level user id
//! and the game-level player id. Constructed once by whatever authenticated
//! the request, then carried immutably through every hop.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The caller identity propagated across service boundaries.
///
/// Either identifier may be nil ("absent"). Strict resolution rejects nil,
/// so a `CallerIdentity` read back through a strict accessor is guaranteed
/// complete; one assembled by hand carries no such guarantee until checked
/// with [`is_complete`](CallerIdentity::is_complete).
///
/// ## Design Notes
///
/// - Fields are public for direct access (no getter boilerplate)
/// - `Copy`: two UUIDs, cheaper to copy than to track borrows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Account-level user id.
    pub user_id: Uuid,

    /// Game-level player id.
    pub player_id: Uuid,
}

impl CallerIdentity {
    pub fn new(user_id: Uuid, player_id: Uuid) -> Self {
        Self { user_id, player_id }
    }

    /// Identity with both fields nil.
    pub fn nil() -> Self {
        Self::new(Uuid::nil(), Uuid::nil())
    }

    /// Both identifiers are non-nil.
    pub fn is_complete(&self) -> bool {
        !self.user_id.is_nil() && !self.player_id.is_nil()
    }

    /// Check whether the caller's user id matches a resource owner.
    ///
    /// Useful for ownership checks in handlers:
    ///
    /// ```rust,no_run
    /// # use uuid::Uuid;
    /// # use grpc_identity_propagation::CallerIdentity;
    /// # let identity = CallerIdentity::new(Uuid::new_v4(), Uuid::new_v4());
    /// let resource_owner_id = Uuid::new_v4();
    ///
    /// if !identity.is_owner(&resource_owner_id) {
    ///     // Return permission denied
    /// }
    /// ```
    pub fn is_owner(&self, resource_owner_id: &Uuid) -> bool {
        &self.user_id == resource_owner_id
    }
}
