//! Enforcement points for guarded views and actions.

use faultline_core::{AppId, Level};

use crate::context::RequestContext;
use crate::error::AccessDenied;

/// Check whether `ctx` holds at least `required` on `app`.
///
/// Answers false for unauthenticated contexts; never errors, which makes
/// it safe to call from rendering code that shows or hides an action.
pub fn has_permission(ctx: &RequestContext, app: &AppId, required: Level) -> bool {
    match ctx.identity() {
        Some(identity) => identity.permission_for(app).satisfies(required),
        None => false,
    }
}

/// Demand at least `required` on `app` before a guarded operation starts.
///
/// Call at entry, ahead of any side effect of the operation being guarded.
pub fn require_permission(
    ctx: &RequestContext,
    app: &AppId,
    required: Level,
) -> Result<(), AccessDenied> {
    if has_permission(ctx, app, required) {
        Ok(())
    } else {
        tracing::debug!(%app, %required, "permission denied");
        Err(AccessDenied::Insufficient {
            app: app.clone(),
            required,
        })
    }
}

/// A reusable entry guard composed at handler registration time.
///
/// Pairs the minimum [`Level`] with a function that pulls the target app
/// out of the operation's own parameters. Handlers call [`check`] on every
/// entry; when the extractor cannot name an app the request is denied.
///
/// [`check`]: EntryGuard::check
pub struct EntryGuard<P> {
    required: Level,
    resolve_app: Box<dyn Fn(&P) -> Option<AppId> + Send + Sync>,
}

impl<P> EntryGuard<P> {
    /// Build a guard from a required level and an app extractor.
    pub fn new<F>(required: Level, resolve_app: F) -> Self
    where
        F: Fn(&P) -> Option<AppId> + Send + Sync + 'static,
    {
        Self {
            required,
            resolve_app: Box::new(resolve_app),
        }
    }

    /// The minimum level this guard demands.
    pub fn required(&self) -> Level {
        self.required
    }

    /// Enforce the guard against one request's parameters.
    ///
    /// Returns the resolved app on success so the handler does not extract
    /// it a second time.
    pub fn check(&self, ctx: &RequestContext, params: &P) -> Result<AppId, AccessDenied> {
        let app = (self.resolve_app)(params).ok_or(AccessDenied::UnresolvedApp)?;
        require_permission(ctx, &app, self.required)?;
        Ok(app)
    }

    /// Non-erroring variant of [`check`](Self::check) for rendering choices.
    pub fn allows(&self, ctx: &RequestContext, params: &P) -> bool {
        self.check(ctx, params).is_ok()
    }
}

impl<P> std::fmt::Debug for EntryGuard<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryGuard")
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}
