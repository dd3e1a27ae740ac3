//! End-to-end tests for the access layer: login, session rotation,
//! permission resolution, and account management through the Gatekeeper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use faultline::{
    AccessDenied, AppId, AuthError, EntryGuard, Gatekeeper, GatekeeperConfig, GateError, Grant,
    Identity, Level, MemoryIdentityStore, Page, RequestContext, Role, SessionHooks,
    SqliteIdentityStore, User, Username, GENERIC_LOGIN_MESSAGE,
};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A gate over three seeded accounts:
/// - alice: plain user, Edit grant on "demo"
/// - bob: admin, no grants
/// - carol: admin, View grant on "demo"
async fn seeded_gate() -> Gatekeeper<MemoryIdentityStore> {
    let gate = Gatekeeper::new(MemoryIdentityStore::new(), GatekeeperConfig::default());

    gate.create_user("alice", "wonderland", [Role::User])
        .await
        .unwrap();
    gate.grant(&Username::new("alice"), Grant::new("demo", Level::Edit))
        .await
        .unwrap();

    gate.create_user("bob", "builder", [Role::User, Role::Admin])
        .await
        .unwrap();

    gate.create_user("carol", "christmas", [Role::User, Role::Admin])
        .await
        .unwrap();
    gate.grant(&Username::new("carol"), Grant::new("demo", Level::View))
        .await
        .unwrap();

    gate
}

async fn login_ctx(
    gate: &Gatekeeper<MemoryIdentityStore>,
    username: &str,
    password: &str,
) -> RequestContext {
    let session = gate.login(None, username, password).await.unwrap();
    gate.context(Some(&session.id))
}

#[tokio::test]
async fn test_resolution_scenarios() {
    init_tracing();
    let gate = seeded_gate().await;
    let demo = AppId::new("demo");
    let other = AppId::new("other");

    // alice: the explicit grant scopes her to demo, nothing else.
    let ctx = login_ctx(&gate, "alice", "wonderland").await;
    assert_eq!(gate.permission_level(&ctx, &demo), Level::Edit);
    assert!(gate.has_permission(&ctx, &demo, Level::View));
    assert!(!gate.has_permission(&ctx, &demo, Level::Admin));
    assert_eq!(gate.permission_level(&ctx, &other), Level::None);
    assert!(!gate.has_permission(&ctx, &other, Level::View));

    // bob: admin fallback grants full access everywhere.
    let ctx = login_ctx(&gate, "bob", "builder").await;
    assert_eq!(gate.permission_level(&ctx, &demo), Level::Admin);
    assert_eq!(gate.permission_level(&ctx, &other), Level::Admin);

    // carol: her explicit View grant caps demo despite the admin role.
    let ctx = login_ctx(&gate, "carol", "christmas").await;
    assert_eq!(gate.permission_level(&ctx, &demo), Level::View);
    assert!(!gate.has_permission(&ctx, &demo, Level::Edit));
    assert_eq!(gate.permission_level(&ctx, &other), Level::Admin);
}

#[tokio::test]
async fn test_explicit_none_grant_beats_admin_fallback() -> anyhow::Result<()> {
    let gate = seeded_gate().await;
    let locked = AppId::new("locked");

    gate.grant(&Username::new("bob"), Grant::new("locked", Level::None))
        .await?;

    let ctx = login_ctx(&gate, "bob", "builder").await;
    assert_eq!(gate.permission_level(&ctx, &locked), Level::None);
    assert!(!gate.has_permission(&ctx, &locked, Level::View));
    // Elsewhere the fallback still applies.
    assert_eq!(gate.permission_level(&ctx, &AppId::new("other")), Level::Admin);
    Ok(())
}

#[tokio::test]
async fn test_login_rotates_presented_session_id() {
    let gate = seeded_gate().await;
    let anon = gate.anonymous_session();

    let session = gate
        .login(Some(&anon.id), "alice", "wonderland")
        .await
        .unwrap();
    assert_ne!(session.id, anon.id);

    // The pre-login id is dead; only the fresh one resolves.
    assert!(gate.context(Some(&anon.id)).session().is_none());
    let ctx = gate.context(Some(&session.id));
    assert_eq!(ctx.username().unwrap().as_str(), "alice");
}

#[tokio::test]
async fn test_login_failures_share_one_user_message() {
    let gate = seeded_gate().await;
    gate.create_user("eve", "fishing", std::iter::empty::<Role>())
        .await
        .unwrap();

    let anon = gate.anonymous_session();

    let wrong_password = gate
        .login(Some(&anon.id), "alice", "hatter")
        .await
        .unwrap_err();
    let unknown_user = gate
        .login(Some(&anon.id), "mallory", "hatter")
        .await
        .unwrap_err();
    let missing_role = gate
        .login(Some(&anon.id), "eve", "fishing")
        .await
        .unwrap_err();

    assert!(matches!(
        wrong_password,
        GateError::Auth(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        unknown_user,
        GateError::Auth(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        missing_role,
        GateError::Auth(AuthError::InsufficientRole { .. })
    ));

    let expected = Some(GENERIC_LOGIN_MESSAGE);
    assert_eq!(wrong_password.user_message(), expected);
    assert_eq!(unknown_user.user_message(), expected);
    assert_eq!(missing_role.user_message(), expected);

    // No failure disturbed the presented session, and none authenticated it.
    let ctx = gate.context(Some(&anon.id));
    assert!(ctx.session().is_some());
    assert!(!ctx.is_authenticated());
}

#[tokio::test]
async fn test_username_lookup_ignores_case() {
    let gate = seeded_gate().await;
    let session = gate.login(None, "Alice", "wonderland").await.unwrap();
    let ctx = gate.context(Some(&session.id));
    assert_eq!(ctx.username().unwrap().as_str(), "alice");
    assert!(gate.has_permission(&ctx, &AppId::new("demo"), Level::Edit));
}

#[tokio::test]
async fn test_session_hooks_fire_on_lifecycle_edges() {
    #[derive(Default)]
    struct CountingHooks {
        authenticated: AtomicUsize,
        logged_out: AtomicUsize,
    }

    impl SessionHooks for CountingHooks {
        fn on_authenticated(&self, _identity: &Identity) {
            self.authenticated.fetch_add(1, Ordering::SeqCst);
        }

        fn on_logged_out(&self) {
            self.logged_out.fetch_add(1, Ordering::SeqCst);
        }
    }

    let hooks = Arc::new(CountingHooks::default());
    let gate = Gatekeeper::new(MemoryIdentityStore::new(), GatekeeperConfig::default())
        .with_hooks(hooks.clone());
    gate.create_user("alice", "wonderland", [Role::User])
        .await
        .unwrap();

    assert!(gate.login(None, "alice", "hatter").await.is_err());
    assert_eq!(hooks.authenticated.load(Ordering::SeqCst), 0);

    let session = gate.login(None, "alice", "wonderland").await.unwrap();
    assert_eq!(hooks.authenticated.load(Ordering::SeqCst), 1);

    // Logout is idempotent and the hook fires only on actual destruction.
    assert!(gate.logout(&session.id));
    assert!(!gate.logout(&session.id));
    assert_eq!(hooks.logged_out.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_sessions_resolve_to_anonymous() {
    let config = GatekeeperConfig {
        session_ttl: Duration::ZERO,
        ..Default::default()
    };
    let gate = Gatekeeper::new(MemoryIdentityStore::new(), config);
    gate.create_user("alice", "wonderland", [Role::User])
        .await
        .unwrap();

    let session = gate.login(None, "alice", "wonderland").await.unwrap();
    let ctx = gate.context(Some(&session.id));
    assert!(ctx.session().is_none());
    assert!(!ctx.is_authenticated());
    assert!(!gate.has_permission(&ctx, &AppId::new("demo"), Level::View));
}

#[tokio::test]
async fn test_grant_replacement_and_live_resolution() -> anyhow::Result<()> {
    let gate = seeded_gate().await;
    let alice = Username::new("alice");
    let demo = AppId::new("demo");

    let session = gate.login(None, "alice", "wonderland").await?;
    let ctx = gate.context(Some(&session.id));
    assert_eq!(gate.permission_level(&ctx, &demo), Level::Edit);

    let replaced = gate.grant(&alice, Grant::new("demo", Level::View)).await?;
    assert_eq!(replaced, Some(Level::Edit));

    // Store reads see the change immediately; the session identity is a
    // login-time snapshot and does not.
    assert_eq!(gate.permission_for_user(&alice, &demo).await?, Level::View);
    assert_eq!(gate.permission_level(&ctx, &demo), Level::Edit);

    // A fresh login picks up the replacement.
    let session = gate.login(Some(&session.id), "alice", "wonderland").await?;
    let ctx = gate.context(Some(&session.id));
    assert_eq!(gate.permission_level(&ctx, &demo), Level::View);
    Ok(())
}

#[tokio::test]
async fn test_revoke_grant_restores_fallback() -> anyhow::Result<()> {
    let gate = seeded_gate().await;
    let carol = Username::new("carol");
    let demo = AppId::new("demo");

    assert_eq!(gate.permission_for_user(&carol, &demo).await?, Level::View);
    assert_eq!(gate.revoke_grant(&carol, &demo).await?, Some(Level::View));
    // With the explicit grant gone the admin fallback applies again.
    assert_eq!(gate.permission_for_user(&carol, &demo).await?, Level::Admin);
    assert_eq!(gate.revoke_grant(&carol, &demo).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_change_password_revokes_other_sessions() {
    let gate = seeded_gate().await;
    let first = gate.login(None, "alice", "wonderland").await.unwrap();
    let second = gate.login(None, "alice", "wonderland").await.unwrap();

    gate.change_password(
        &Username::new("alice"),
        "wonderland",
        "looking-glass",
        Some(&second.id),
    )
    .await
    .unwrap();

    assert!(!gate.context(Some(&first.id)).is_authenticated());
    assert!(gate.context(Some(&second.id)).is_authenticated());

    let stale = gate.login(None, "alice", "wonderland").await.unwrap_err();
    assert!(matches!(
        stale,
        GateError::Auth(AuthError::InvalidCredentials)
    ));
    gate.login(None, "alice", "looking-glass").await.unwrap();
}

#[tokio::test]
async fn test_change_password_rejects_wrong_current() {
    let gate = seeded_gate().await;
    let err = gate
        .change_password(&Username::new("alice"), "hatter", "looking-glass", None)
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::Auth(AuthError::InvalidCredentials)));

    // The old password still works.
    gate.login(None, "alice", "wonderland").await.unwrap();
}

#[tokio::test]
async fn test_create_user_rejects_duplicates_case_insensitively() {
    let gate = seeded_gate().await;
    let err = gate
        .create_user("ALICE", "other", [Role::User])
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::UserExists(_)));
}

#[tokio::test]
async fn test_default_admin_provisioned_once() -> anyhow::Result<()> {
    init_tracing();
    let gate = Gatekeeper::new(MemoryIdentityStore::new(), GatekeeperConfig::default());

    let password = gate
        .ensure_default_admin()
        .await?
        .expect("first run provisions the admin account");
    assert!(gate.ensure_default_admin().await?.is_none());

    let session = gate.login(None, "admin", &password).await?;
    let ctx = gate.context(Some(&session.id));
    assert!(ctx.is_admin());
    assert!(gate.has_permission(&ctx, &AppId::new("anything"), Level::Admin));

    // A store that already has an admin is left alone.
    let seeded = seeded_gate().await;
    assert!(seeded.ensure_default_admin().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_role_listing_pages_through_admins() -> anyhow::Result<()> {
    let gate = seeded_gate().await;
    assert_eq!(gate.count_users_with_role(Role::Admin).await?, 2);

    let first = gate.users_with_role(Role::Admin, Page::first(1)).await?;
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].username.as_str(), "bob");
    assert!(first.has_next);

    let second = gate.users_with_role(Role::Admin, first.page.next()).await?;
    assert_eq!(second.items[0].username.as_str(), "carol");
    assert!(!second.has_next);
    Ok(())
}

#[tokio::test]
async fn test_entry_guard_gates_handler_params() {
    struct ReportQuery {
        app: Option<String>,
    }

    let gate = seeded_gate().await;
    let guard: EntryGuard<ReportQuery> = EntryGuard::new(Level::View, |q: &ReportQuery| {
        q.app.as_deref().map(AppId::new)
    });

    let ctx = login_ctx(&gate, "alice", "wonderland").await;

    let app = guard
        .check(
            &ctx,
            &ReportQuery {
                app: Some("demo".into()),
            },
        )
        .unwrap();
    assert_eq!(app, AppId::new("demo"));

    assert!(matches!(
        guard.check(&ctx, &ReportQuery { app: None }),
        Err(AccessDenied::UnresolvedApp)
    ));
    assert!(!guard.allows(
        &ctx,
        &ReportQuery {
            app: Some("secret".into()),
        }
    ));
}

#[tokio::test]
async fn test_accounts_persist_across_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("identity.db");

    {
        let store = SqliteIdentityStore::open(&path)?;
        let gate = Gatekeeper::new(store, GatekeeperConfig::default());
        gate.create_user("alice", "wonderland", [Role::User]).await?;
        gate.grant(&Username::new("alice"), Grant::new("demo", Level::Edit))
            .await?;
    }

    let store = SqliteIdentityStore::open(&path)?;
    let gate = Gatekeeper::new(store, GatekeeperConfig::default());
    let session = gate.login(None, "alice", "wonderland").await?;
    let ctx = gate.context(Some(&session.id));
    assert!(gate.has_permission(&ctx, &AppId::new("demo"), Level::Edit));
    Ok(())
}

fn any_level() -> impl Strategy<Value = Level> {
    prop::sample::select(Level::ALL.to_vec())
}

proptest! {
    // An explicit grant decides its app outright at every level; the admin
    // fallback only fills the gaps.
    #[test]
    fn prop_explicit_grant_decides_before_fallback(granted in any_level()) {
        let user = User::new("carol", "$argon2id$stub")
            .with_role(Role::User)
            .with_role(Role::Admin)
            .with_grant(Grant::new("demo", granted));
        let identity = Identity::from_user(&user);

        prop_assert_eq!(identity.permission_for(&AppId::new("demo")), granted);
        prop_assert_eq!(identity.permission_for(&AppId::new("elsewhere")), Level::Admin);
    }
}
