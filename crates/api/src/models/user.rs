//! Caller identity.

use myngo_core::UserId;

/// The authenticated caller of a request.
///
/// Produced by the auth middleware from a verified bearer token and handed to
/// handlers as an ordinary parameter through `RequireUser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Owner id used to scope every product and tag query.
    pub id: UserId,
    /// Email from the token claims, if present.
    pub email: Option<String>,
}
