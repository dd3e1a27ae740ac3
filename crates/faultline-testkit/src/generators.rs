//! Proptest generators for property-based testing.

use proptest::prelude::*;

use faultline_core::{AppId, Grant, GrantSet, Identity, Level, Role, User, Username};

/// Generate a permission level.
pub fn level() -> impl Strategy<Value = Level> {
    prop::sample::select(Level::ALL.to_vec())
}

/// Generate a role.
pub fn role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

/// Generate a lowercase username.
pub fn username() -> impl Strategy<Value = Username> {
    "[a-z][a-z0-9]{0,15}".prop_map(Username::new)
}

/// Generate an app identifier.
pub fn app_id() -> impl Strategy<Value = AppId> {
    "[a-z][a-z0-9-]{0,23}".prop_map(AppId::new)
}

/// Generate a single grant.
pub fn grant() -> impl Strategy<Value = Grant> {
    (app_id(), level()).prop_map(|(app, level)| Grant::new(app, level))
}

/// Generate a grant set. App uniqueness holds by construction.
pub fn grant_set(max: usize) -> impl Strategy<Value = GrantSet> {
    prop::collection::btree_map("[a-z][a-z0-9-]{0,15}", level(), 0..=max).prop_map(|grants| {
        grants
            .into_iter()
            .map(|(app, level)| Grant::new(app, level))
            .collect()
    })
}

/// Parameters for generating a user record.
#[derive(Debug, Clone)]
pub struct UserParams {
    pub username: Username,
    pub roles: Vec<Role>,
    pub grants: GrantSet,
}

impl Arbitrary for UserParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (username(), prop::collection::vec(role(), 0..=3), grant_set(4))
            .prop_map(|(username, roles, grants)| UserParams {
                username,
                roles,
                grants,
            })
            .boxed()
    }
}

/// Build a user record from parameters.
///
/// The credential hash is a stub that never verifies.
pub fn user_from_params(params: &UserParams) -> User {
    let mut user = User::new(params.username.clone(), "$argon2id$stub");
    for role in &params.roles {
        user = user.with_role(*role);
    }
    for grant in &params.grants {
        user = user.with_grant(grant.clone());
    }
    user
}

/// Generate an identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<UserParams>().prop_map(|params| Identity::from_user(&user_from_params(&params)))
}
