//! Calendar permissions

use std::fmt;

/// Permission names checked before mutating calendar data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageCategories,
    ManageEvents,
}

impl Permission {
    /// Permission that implies every other one
    pub const ADMIN: &'static str = "admin";

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageCategories => "category: manage categories",
            Permission::ManageEvents => "calendar: manage events",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
