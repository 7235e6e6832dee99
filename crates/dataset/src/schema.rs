use std::fmt;

use serde::{Deserialize, Serialize};

pub type Hash32 = [u8; 32];

/// Minimum number of messages in one conversation record.
pub const MIN_MESSAGES: usize = 2;

/// Speaker of a message. The set is closed: anything else is an invalid role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::System, Role::User, Role::Assistant];

    /// Exact, case-sensitive match on the wire name.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which roles a record produced at least one valid message for.
#[derive(Clone, Copy, Debug, Default)]
pub struct RolesSeen {
    pub system: bool,
    pub user: bool,
    pub assistant: bool,
}

impl RolesSeen {
    pub fn mark(&mut self, role: Role) {
        match role {
            Role::System => self.system = true,
            Role::User => self.user = true,
            Role::Assistant => self.assistant = true,
        }
    }
}
