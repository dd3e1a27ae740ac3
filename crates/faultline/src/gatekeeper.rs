//! The Gatekeeper: unified API for the Faultline access layer.
//!
//! The Gatekeeper wires the authenticator, the session table, and the
//! identity store into one interface for building the viewer on top of.

use std::sync::Arc;
use std::time::Duration;

use faultline_access::{
    generate_password, require_role, Argon2Scheme, Authenticator, CredentialScheme, RequestContext,
    Session, SessionHooks, SessionId, SessionManager,
};
use faultline_core::{AppId, Grant, Level, Role, User, Username};
use faultline_store::{IdentityStore, Page, Slice};

use crate::error::{GateError, Result};

/// Username of the account [`Gatekeeper::ensure_default_admin`] creates.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Configuration for the Gatekeeper.
#[derive(Debug, Clone)]
pub struct GatekeeperConfig {
    /// How long a session lives after issuance.
    pub session_ttl: Duration,
    /// Role every login must carry before a session is established.
    pub required_role: Role,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(8 * 60 * 60),
            required_role: Role::User,
        }
    }
}

/// The main Gatekeeper struct.
///
/// Provides a unified API for:
/// - Logging users in and out
/// - Building per-request contexts from presented session ids
/// - Checking and enforcing per-app permission levels
/// - Managing accounts and grants
pub struct Gatekeeper<S: IdentityStore> {
    /// The account storage backend.
    store: Arc<S>,
    /// Credential hashing scheme shared with the authenticator.
    scheme: Arc<dyn CredentialScheme>,
    /// Credential verification over the store.
    authenticator: Authenticator<S>,
    /// In-process session table.
    sessions: SessionManager,
    /// Configuration.
    config: GatekeeperConfig,
    /// Optional lifecycle hooks for the presentation layer.
    hooks: Option<Arc<dyn SessionHooks>>,
}

impl<S: IdentityStore> Gatekeeper<S> {
    /// Create a new Gatekeeper over a store.
    pub fn new(store: S, config: GatekeeperConfig) -> Self {
        let store = Arc::new(store);
        let scheme: Arc<dyn CredentialScheme> = Arc::new(Argon2Scheme);
        Self {
            authenticator: Authenticator::new(Arc::clone(&store), Arc::clone(&scheme)),
            sessions: SessionManager::new(config.session_ttl),
            store,
            scheme,
            config,
            hooks: None,
        }
    }

    /// Attach lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Replace the credential scheme.
    pub fn with_scheme(mut self, scheme: Arc<dyn CredentialScheme>) -> Self {
        self.authenticator = Authenticator::new(Arc::clone(&self.store), Arc::clone(&scheme));
        self.scheme = scheme;
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Get the active configuration.
    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Log a user in and establish a fresh session.
    ///
    /// Checks run in order: credentials, then the baseline role, then
    /// session establishment. A failure at any step leaves the presented
    /// session exactly as it was; rotation happens only on full success.
    pub async fn login(
        &self,
        presented: Option<&SessionId>,
        username: &str,
        password: &str,
    ) -> Result<Session> {
        let identity = self.authenticator.authenticate(username, password).await?;
        let identity = require_role(identity, self.config.required_role)?;

        let session = self.sessions.establish(presented, identity);
        if let Some(identity) = session.identity.as_ref() {
            tracing::info!(username = %identity.username(), session = %session.id, "login succeeded");
            if let Some(hooks) = self.hooks.as_deref() {
                hooks.on_authenticated(identity);
            }
        }
        Ok(session)
    }

    /// Open an anonymous session for a pre-login conversation.
    pub fn anonymous_session(&self) -> Session {
        self.sessions.open_anonymous()
    }

    /// Build the request context for a presented session id, if any.
    pub fn context(&self, presented: Option<&SessionId>) -> RequestContext {
        self.sessions.context(presented)
    }

    /// Destroy a session. Safe to call for ids that no longer resolve;
    /// only the first call for a given id returns true.
    pub fn logout(&self, id: &SessionId) -> bool {
        let removed = self.sessions.logout(id);
        if removed {
            tracing::info!(session = %id, "logged out");
            if let Some(hooks) = self.hooks.as_deref() {
                hooks.on_logged_out();
            }
        }
        removed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Check whether `ctx` holds at least `required` on `app`.
    pub fn has_permission(&self, ctx: &RequestContext, app: &AppId, required: Level) -> bool {
        faultline_access::has_permission(ctx, app, required)
    }

    /// Demand at least `required` on `app`; an `Err` is an ordinary denial.
    pub fn require_permission(
        &self,
        ctx: &RequestContext,
        app: &AppId,
        required: Level,
    ) -> Result<()> {
        Ok(faultline_access::require_permission(ctx, app, required)?)
    }

    /// Effective level of the context's identity on `app`.
    pub fn permission_level(&self, ctx: &RequestContext, app: &AppId) -> Level {
        ctx.permission_for(app)
    }

    /// Resolve a stored account's effective level on `app`.
    ///
    /// Reads through to the store. The identity inside a live session is a
    /// snapshot from login time; this call sees grant changes immediately.
    pub async fn permission_for_user(&self, username: &Username, app: &AppId) -> Result<Level> {
        let user = self
            .store
            .find_user(username)
            .await?
            .ok_or_else(|| GateError::UserNotFound(username.clone()))?;
        Ok(user.permission_for(app))
    }

    /// Issue a grant, replacing any existing grant for the same app.
    ///
    /// Returns the level that was replaced, if any.
    pub async fn grant(&self, username: &Username, grant: Grant) -> Result<Option<Level>> {
        let app = grant.app.clone();
        let level = grant.level;
        let replaced = self.store.put_grant(username, grant).await?;
        tracing::info!(username = %username, app = %app, %level, ?replaced, "grant issued");
        Ok(replaced)
    }

    /// Revoke the grant for an app, returning its level if one existed.
    pub async fn revoke_grant(&self, username: &Username, app: &AppId) -> Result<Option<Level>> {
        let removed = self.store.remove_grant(username, app).await?;
        if removed.is_some() {
            tracing::info!(username = %username, app = %app, "grant revoked");
        }
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Account Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an account with a fresh credential hash.
    ///
    /// Returns the normalized username.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<Username> {
        let username = Username::new(username);
        if self.store.find_user(&username).await?.is_some() {
            return Err(GateError::UserExists(username));
        }

        let hash = self.scheme.hash(password)?;
        let mut user = User::new(username.clone(), hash);
        for role in roles {
            user = user.with_role(role);
        }
        self.store.upsert_user(&user).await?;
        tracing::info!(username = %username, "user created");
        Ok(username)
    }

    /// Change a password after verifying the current one.
    ///
    /// Revokes the user's other sessions; `current_session` survives so
    /// the caller stays logged in.
    pub async fn change_password(
        &self,
        username: &Username,
        current_password: &str,
        new_password: &str,
        current_session: Option<&SessionId>,
    ) -> Result<()> {
        let user = self
            .store
            .find_user(username)
            .await?
            .ok_or_else(|| GateError::UserNotFound(username.clone()))?;

        if !self.scheme.verify(current_password, &user.password_hash) {
            return Err(GateError::Auth(
                faultline_access::AuthError::InvalidCredentials,
            ));
        }

        let hash = self.scheme.hash(new_password)?;
        self.store.set_password_hash(username, &hash).await?;

        let revoked = self.sessions.revoke_user_except(username, current_session);
        tracing::info!(username = %username, revoked, "password changed");
        Ok(())
    }

    /// Create the default admin account when no admin exists yet.
    ///
    /// Returns the generated password exactly once, for the operator to
    /// record out of band. The password itself never reaches the logs.
    /// The account carries the baseline user role as well as admin so it
    /// can pass the login gate.
    pub async fn ensure_default_admin(&self) -> Result<Option<String>> {
        if self.store.count_users_with_role(Role::Admin).await? > 0 {
            return Ok(None);
        }

        let password = generate_password();
        let hash = self.scheme.hash(&password)?;
        let admin = User::new(DEFAULT_ADMIN_USERNAME, hash)
            .with_role(Role::Admin)
            .with_role(Role::User);
        self.store.upsert_user(&admin).await?;
        tracing::info!(username = DEFAULT_ADMIN_USERNAME, "default admin account created");
        Ok(Some(password))
    }

    /// Count accounts carrying a role.
    pub async fn count_users_with_role(&self, role: Role) -> Result<u64> {
        Ok(self.store.count_users_with_role(role).await?)
    }

    /// List accounts carrying a role, ordered by username.
    pub async fn users_with_role(&self, role: Role, page: Page) -> Result<Slice<User>> {
        Ok(self.store.users_with_role(role, page).await?)
    }
}
