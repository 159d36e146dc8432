use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::catalog::{Category, Role, RoleParseError};

/// The set of roles held by one account or proposed on one access request.
///
/// Stored as a comma-joined string, handled in logic as a set. Insertion
/// order is preserved for display but carries no meaning: equality is
/// order-insensitive. Members are unique.
#[derive(Debug, Clone, Default)]
pub struct RoleSet {
    members: Vec<Role>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the stored comma-joined form. Tolerates stray whitespace
    /// around identifiers; never produces duplicates. An empty or
    /// all-whitespace string is the empty set.
    pub fn parse(raw: &str) -> Result<Self, RoleParseError> {
        let mut set = RoleSet::new();
        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            set.insert(token.parse()?);
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.members.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.members.iter().copied()
    }

    /// True when any member appears in `roles`.
    pub fn intersects(&self, roles: &[Role]) -> bool {
        self.members.iter().any(|r| roles.contains(r))
    }

    fn insert(&mut self, role: Role) {
        if !self.members.contains(&role) {
            self.members.push(role);
        }
    }

    /// Copy with `role` appended (no-op when already present).
    pub fn with(&self, role: Role) -> Self {
        let mut next = self.clone();
        next.insert(role);
        next
    }

    /// Copy with `role` removed.
    pub fn without(&self, role: Role) -> Self {
        Self {
            members: self.members.iter().copied().filter(|r| *r != role).collect(),
        }
    }

    /// The invariant every persisted set must satisfy: empty, or entirely
    /// admin-category with admin/accountant mutually exclusive, or entirely
    /// operator-category.
    pub fn is_coherent(&self) -> bool {
        let has_admin_side = self.members.iter().any(|r| r.category() == Category::Admin);
        let has_operator_side = self
            .members
            .iter()
            .any(|r| r.category() == Category::Operator);
        if has_admin_side && has_operator_side {
            return false;
        }
        !(self.contains(Role::Admin) && self.contains(Role::Accountant))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::new();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl PartialEq for RoleSet {
    fn eq(&self, other: &Self) -> bool {
        self.members.len() == other.members.len()
            && self.members.iter().all(|r| other.members.contains(r))
    }
}

impl Eq for RoleSet {}

impl Display for RoleSet {
    /// Comma-joined identifiers, no surrounding whitespace, insertion order.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, role) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(role.as_str())?;
        }
        Ok(())
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RoleSet::parse(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip_in_insertion_order() {
        let set = RoleSet::parse("oilOperator,dieselOperator").unwrap();
        assert_eq!(set.to_string(), "oilOperator,dieselOperator");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn parse_tolerates_whitespace_and_duplicates() {
        let set = RoleSet::parse(" admin , admin ,").unwrap();
        assert_eq!(set.to_string(), "admin");
    }

    #[test]
    fn parse_rejects_unknown_identifiers() {
        let err = RoleSet::parse("admin,superuser").unwrap_err();
        assert_eq!(err, RoleParseError("superuser".to_string()));
    }

    #[test]
    fn equality_ignores_order() {
        let a = RoleSet::parse("oilOperator,wasteOperator").unwrap();
        let b = RoleSet::parse("wasteOperator,oilOperator").unwrap();
        assert_eq!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn empty_string_is_the_empty_set() {
        assert!(RoleSet::parse("").unwrap().is_empty());
        assert!(RoleSet::parse("  ").unwrap().is_empty());
    }

    #[test]
    fn coherence_matches_the_category_rules() {
        assert!(RoleSet::new().is_coherent());
        assert!(RoleSet::parse("admin").unwrap().is_coherent());
        assert!(RoleSet::parse("dieselOperator,oilOperator,wasteOperator")
            .unwrap()
            .is_coherent());
        assert!(!RoleSet::parse("admin,accountant").unwrap().is_coherent());
        assert!(!RoleSet::parse("accountant,oilOperator").unwrap().is_coherent());
    }

    #[test]
    fn serde_uses_the_comma_joined_form() {
        let set = RoleSet::parse("admin").unwrap();
        assert_eq!(serde_json::to_value(&set).unwrap(), serde_json::json!("admin"));
        let back: RoleSet = serde_json::from_value(serde_json::json!("accountant")).unwrap();
        assert_eq!(back.to_string(), "accountant");
    }
}
