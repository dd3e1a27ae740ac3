//! Test fixtures and helpers.
//!
//! Common setup code for integration tests across the workspace.

use faultline::{
    Gatekeeper, GatekeeperConfig, Grant, IdentityStore, Level, MemoryIdentityStore,
    RequestContext, Role, User, Username,
};

/// Password of the seeded `alice` account.
pub const ALICE_PASSWORD: &str = "wonderland";
/// Password of the seeded `bob` account.
pub const BOB_PASSWORD: &str = "builder";
/// Password of the seeded `carol` account.
pub const CAROL_PASSWORD: &str = "christmas";

/// The app the canonical grants target.
pub const DEMO_APP: &str = "demo";

/// A gate over the three canonical accounts:
///
/// - `alice`: plain user with an Edit grant on "demo"
/// - `bob`: admin with no grants
/// - `carol`: admin with a View grant on "demo"
pub struct AccessFixture {
    pub gate: Gatekeeper<MemoryIdentityStore>,
}

impl AccessFixture {
    /// Create a fixture with the canonical accounts seeded.
    pub async fn new() -> Self {
        Self::with_config(GatekeeperConfig::default()).await
    }

    /// Create with a custom configuration.
    pub async fn with_config(config: GatekeeperConfig) -> Self {
        let gate = Gatekeeper::new(MemoryIdentityStore::new(), config);
        seed_canonical_users(&gate).await;
        Self { gate }
    }

    /// Log an account in and return its request context.
    pub async fn login_ctx(&self, username: &str, password: &str) -> RequestContext {
        let session = self
            .gate
            .login(None, username, password)
            .await
            .expect("fixture login");
        self.gate.context(Some(&session.id))
    }
}

/// Seed the canonical accounts into a gate over any store.
pub async fn seed_canonical_users<S: IdentityStore>(gate: &Gatekeeper<S>) {
    gate.create_user("alice", ALICE_PASSWORD, [Role::User])
        .await
        .expect("seed alice");
    gate.grant(&Username::new("alice"), Grant::new(DEMO_APP, Level::Edit))
        .await
        .expect("grant alice");

    gate.create_user("bob", BOB_PASSWORD, [Role::User, Role::Admin])
        .await
        .expect("seed bob");

    gate.create_user("carol", CAROL_PASSWORD, [Role::User, Role::Admin])
        .await
        .expect("seed carol");
    gate.grant(&Username::new("carol"), Grant::new(DEMO_APP, Level::View))
        .await
        .expect("grant carol");
}

/// Seed `count` numbered reporter accounts, `reporter-0` onward.
///
/// Reporters carry only [`Role::Reporter`], so they authenticate for report
/// submission but never pass the baseline login gate.
pub async fn seed_reporters<S: IdentityStore>(gate: &Gatekeeper<S>, count: usize) {
    for i in 0..count {
        gate.create_user(&format!("reporter-{i}"), "report", [Role::Reporter])
            .await
            .expect("seed reporter");
    }
}

/// Build a user record directly, bypassing the gate.
///
/// The credential hash is a stub that never verifies; use this for pure
/// resolution tests, not for login flows.
pub fn user_with(username: &str, roles: &[Role], grants: &[(&str, Level)]) -> User {
    let mut user = User::new(username, "$argon2id$stub");
    for role in roles {
        user = user.with_role(*role);
    }
    for (app, level) in grants {
        user = user.with_grant(Grant::new(*app, *level));
    }
    user
}
