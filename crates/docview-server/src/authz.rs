//! Authorization store queried by templates.

use std::collections::{BTreeMap, BTreeSet};

/// Answers "is this user known" and "is this user in that group".
///
/// Identities come from an upstream header and are trusted as-is.
pub trait UserDirectory: Send + Sync {
    /// True when `user` is a known user.
    fn is_known(&self, user: &str) -> bool;

    /// True when `user` belongs to `group`.
    fn in_group(&self, user: &str, group: &str) -> bool;
}

/// Users and their groups, from the `[authz.users]` table.
#[derive(Debug, Clone, Default)]
pub struct UserMap {
    users: BTreeMap<String, BTreeSet<String>>,
}

impl UserMap {
    /// Build from a user → groups table.
    #[must_use]
    pub fn new(users: &BTreeMap<String, Vec<String>>) -> Self {
        Self {
            users: users
                .iter()
                .map(|(user, groups)| (user.clone(), groups.iter().cloned().collect()))
                .collect(),
        }
    }
}

impl UserDirectory for UserMap {
    fn is_known(&self, user: &str) -> bool {
        !user.is_empty() && self.users.contains_key(user)
    }

    fn in_group(&self, user: &str, group: &str) -> bool {
        self.users
            .get(user)
            .is_some_and(|groups| groups.contains(group))
    }
}
