use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of roles recognized by the console.
///
/// Wire identifiers are the camelCase strings used in the stored
/// `roles` field; they never change without a data migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Accountant,
    DieselOperator,
    OilOperator,
    WasteOperator,
}

/// Coarse grouping used by the selection rules: admin-side roles and
/// operator-side roles never mix within one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Admin,
    Operator,
}

impl Role {
    /// Fixed display order, all five roles.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Accountant,
        Role::DieselOperator,
        Role::OilOperator,
        Role::WasteOperator,
    ];

    pub fn category(self) -> Category {
        match self {
            Role::Admin | Role::Accountant => Category::Admin,
            Role::DieselOperator | Role::OilOperator | Role::WasteOperator => Category::Operator,
        }
    }

    /// Stored identifier, exactly as it appears inside the comma-joined
    /// `roles` string.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Accountant => "accountant",
            Role::DieselOperator => "dieselOperator",
            Role::OilOperator => "oilOperator",
            Role::WasteOperator => "wasteOperator",
        }
    }

    /// Human-readable label for pickers and summaries.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Accountant => "Accountant",
            Role::DieselOperator => "Diesel Operator",
            Role::OilOperator => "Oil Operator",
            Role::WasteOperator => "Waste Operator",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Admin => "Full control over the system",
            Role::Accountant => "Access to financial reports",
            Role::DieselOperator => "Access to diesel operations",
            Role::OilOperator => "Access to oil operations",
            Role::WasteOperator => "Access to waste operations",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The enum is closed, but the string boundary can see foreign data,
/// so parsing stays fallible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized role identifier: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "accountant" => Ok(Role::Accountant),
            "dieselOperator" => Ok(Role::DieselOperator),
            "oilOperator" => Ok(Role::OilOperator),
            "wasteOperator" => Ok(Role::WasteOperator),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}
