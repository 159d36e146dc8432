use crate::roles::RoleSet;

/// The decision handed to a protected-route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// What a protected resource demands of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Required {
    /// Any authenticated session with at least one role.
    AnyAuthenticated,
    /// A session holding at least one of these roles.
    AnyOf(RoleSet),
}

/// Pure allow/deny gate, re-evaluated on every access so role edits take
/// effect on the next check rather than being cached into a stale grant.
pub fn authorize(user_roles: &RoleSet, required: &Required) -> Access {
    let allowed = match required {
        Required::AnyAuthenticated => !user_roles.is_empty(),
        Required::AnyOf(needed) => needed.iter().any(|role| user_roles.contains(role)),
    };
    if allowed {
        Access::Allow
    } else {
        Access::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(raw: &str) -> RoleSet {
        RoleSet::parse(raw).unwrap()
    }

    #[test]
    fn allows_exactly_on_non_empty_intersection() {
        for user in ["admin", "accountant", "admin", "oilOperator,wasteOperator"] {
            for required in ["admin", "accountant", "admin,accountant", "wasteOperator"] {
                let user_roles = set(user);
                let needed = set(required);
                let expect = needed.iter().any(|r| user_roles.contains(r));
                let got = authorize(&user_roles, &Required::AnyOf(needed));
                assert_eq!(got == Access::Allow, expect, "user={user} required={required}");
            }
        }
    }

    #[test]
    fn any_authenticated_means_any_non_empty_role_set() {
        assert_eq!(
            authorize(&set("accountant"), &Required::AnyAuthenticated),
            Access::Allow
        );
        assert_eq!(
            authorize(&RoleSet::new(), &Required::AnyAuthenticated),
            Access::Deny
        );
    }

    #[test]
    fn an_empty_requirement_denies() {
        // An explicit empty allow-list is a closed resource, not an open one.
        assert_eq!(
            authorize(&set("admin"), &Required::AnyOf(RoleSet::new())),
            Access::Deny
        );
    }
}
