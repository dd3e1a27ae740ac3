//! Request-scoped authentication context.

use faultline_core::{AppId, Identity, Level, Role, Username};

use crate::session::Session;

/// The authentication state of one inbound request.
///
/// Built at the request boundary from the presented session identifier and
/// passed explicitly into guarded calls. There is no ambient "current
/// identity"; code that needs one takes a `&RequestContext` parameter.
#[derive(Debug, Clone)]
pub struct RequestContext {
    session: Option<Session>,
}

impl RequestContext {
    /// A context with no session at all.
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    /// A context carrying a validated session.
    pub fn for_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// The session, if one was presented and valid.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.session.as_ref().and_then(|s| s.identity.as_ref())
    }

    /// Whether an authenticated identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    /// The authenticated username, if any.
    pub fn username(&self) -> Option<&Username> {
        self.identity().map(Identity::username)
    }

    /// Whether the identity carries `role`. False when unauthenticated.
    pub fn has_role(&self, role: Role) -> bool {
        self.identity().map(|i| i.has_role(role)).unwrap_or(false)
    }

    /// Whether the identity holds the global admin role.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Effective level on `app`. [`Level::None`] when unauthenticated.
    pub fn permission_for(&self, app: &AppId) -> Level {
        self.identity()
            .map(|identity| identity.permission_for(app))
            .unwrap_or(Level::None)
    }
}
