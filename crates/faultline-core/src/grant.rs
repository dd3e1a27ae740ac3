//! Per-app permission grants.

use serde::{Deserialize, Serialize};

use crate::level::Level;
use crate::types::AppId;

/// A discretionary access record scoping one [`Level`] to one app.
///
/// An explicit grant always beats the global admin fallback, including a
/// grant of [`Level::None`]: issuing `(app, none)` deliberately locks an
/// admin out of that app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The app the grant is scoped to.
    pub app: AppId,
    /// The granted level.
    pub level: Level,
}

impl Grant {
    /// Create a grant.
    pub fn new(app: impl Into<AppId>, level: Level) -> Self {
        Self {
            app: app.into(),
            level,
        }
    }
}

/// A user's grants, at most one per app.
///
/// [`GrantSet::put`] replaces any existing grant for the same app, so the
/// at-most-one invariant holds by construction and resolution never has to
/// break ties between duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GrantSet {
    grants: Vec<Grant>,
}

impl GrantSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a grant, replacing any existing grant for the same app.
    ///
    /// Returns the level that was replaced, if any.
    pub fn put(&mut self, grant: Grant) -> Option<Level> {
        match self.grants.iter_mut().find(|g| g.app == grant.app) {
            Some(existing) => {
                let replaced = existing.level;
                existing.level = grant.level;
                Some(replaced)
            }
            None => {
                self.grants.push(grant);
                None
            }
        }
    }

    /// Remove the grant for an app, returning its level if one existed.
    pub fn remove(&mut self, app: &AppId) -> Option<Level> {
        let pos = self.grants.iter().position(|g| g.app == *app)?;
        Some(self.grants.remove(pos).level)
    }

    /// Look up the granted level for an app.
    pub fn level_for(&self, app: &AppId) -> Option<Level> {
        self.grants.iter().find(|g| g.app == *app).map(|g| g.level)
    }

    /// Iterate over the grants.
    pub fn iter(&self) -> impl Iterator<Item = &Grant> {
        self.grants.iter()
    }

    /// Number of grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Check for emptiness.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl FromIterator<Grant> for GrantSet {
    fn from_iter<I: IntoIterator<Item = Grant>>(iter: I) -> Self {
        let mut set = Self::new();
        for grant in iter {
            set.put(grant);
        }
        set
    }
}

impl<'a> IntoIterator for &'a GrantSet {
    type Item = &'a Grant;
    type IntoIter = std::slice::Iter<'a, Grant>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.iter()
    }
}

// Goes through `put`, so duplicate apps in serialized input collapse to the
// last entry instead of producing an invalid set.
impl<'de> Deserialize<'de> for GrantSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let grants = Vec::<Grant>::deserialize(deserializer)?;
        Ok(grants.into_iter().collect())
    }
}
