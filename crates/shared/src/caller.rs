use serde::{Deserialize, Serialize};

use crate::{Error, Result, Role};

/// Where notifications for a user go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

/// The identity an operation runs on behalf of. Built by the presentation
/// layer and passed explicitly into every call that needs it.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<()> {
        if !self.is_admin() {
            return Err(Error::Forbidden);
        }

        Ok(())
    }

    pub fn owns(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
