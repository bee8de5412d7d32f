use std::fmt;

use serde::{Deserialize, Serialize};

/// The account a sync pass runs for.
///
/// `kind` is the account type the calendar is filed under, `name` the
/// user-facing account name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Account {
    pub fn new(name: &str, kind: &str) -> Self {
        Account {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}
