//! Session roles and the actions they may perform on the catalogue.
//!
//! Credentials are resolved elsewhere; the catalogue only ever sees the
//! resulting [`Role`].

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Library member: browse, search, borrow and return
    #[default]
    Client,

    /// Librarian: everything a client can do, plus catalogue maintenance
    Admin,

    /// Administrator of the whole system
    SuperAdmin,
}

/// Catalogue operations subject to a role check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Search,
    Borrow,
    Return,
    Statistics,
    Add,
    Remove,
    Seed,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::View => "view",
            Action::Search => "search",
            Action::Borrow => "borrow",
            Action::Return => "return",
            Action::Statistics => "statistics",
            Action::Add => "add",
            Action::Remove => "remove",
            Action::Seed => "seed",
        };
        f.write_str(name)
    }
}

/// The current role may not perform the requested action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Role '{role}' is not allowed to {action}")]
pub struct AccessDenied {
    pub role: Role,
    pub action: Action,
}

impl Role {
    /// Whether this role is allowed to perform `action`
    pub fn can(&self, action: Action) -> bool {
        match action {
            Action::View | Action::Search | Action::Borrow | Action::Return => true,
            Action::Statistics | Action::Add | Action::Remove | Action::Seed => {
                matches!(self, Role::Admin | Role::SuperAdmin)
            }
        }
    }

    /// Gate an action, returning [`AccessDenied`] when not permitted
    pub fn authorize(&self, action: Action) -> Result<(), AccessDenied> {
        if self.can(action) {
            Ok(())
        } else {
            Err(AccessDenied { role: *self, action })
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "super-admin"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            "super-admin" | "superadmin" | "super_admin" => Ok(Role::SuperAdmin),
            _ => anyhow::bail!("Unknown role: {}", s),
        }
    }
}
