//! Role Gate
//!
//! Capability checks on an already-authenticated caller. Token issuance and
//! verification happen upstream; by the time the core is invoked the caller
//! has been resolved to an [`Actor`] (identity + role). The transport layer
//! calls [`require_role`] / [`require_any_role`] before dispatching to any
//! engine; the engines never re-derive role from raw input.

mod errors;

pub use errors::{GateError, GateResult};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller role, resolved upstream of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Returns the role name string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Parse a role from its wire representation.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Opaque identity, assigned upstream
    pub id: String,
    /// Resolved role
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

/// Require the actor to hold exactly the given role.
pub fn require_role(actor: &Actor, required: Role) -> GateResult<()> {
    if actor.role == required {
        Ok(())
    } else {
        Err(GateError::AccessDenied {
            actor_id: actor.id.clone(),
            required: required.as_str(),
            actual: actor.role,
        })
    }
}

/// Require the actor to hold one of the given roles.
pub fn require_any_role(actor: &Actor, allowed: &[Role]) -> GateResult<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(GateError::AccessDenied {
            actor_id: actor.id.clone(),
            required: "one of the permitted roles",
            actual: actor.role,
        })
    }
}
