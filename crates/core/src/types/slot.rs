//! Fixed address slots.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A positional address slot. A user holds at most [`AddressSlot::CAPACITY`]
/// addresses; index 0 is home and index 1 is work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSlot {
    Home,
    Work,
}

impl AddressSlot {
    /// Maximum number of addresses a user may hold.
    pub const CAPACITY: usize = 2;

    /// Array index of this slot in the user's address list.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Work => 1,
        }
    }
}

impl fmt::Display for AddressSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::Work => f.write_str("work"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_indices() {
        assert_eq!(AddressSlot::Home.index(), 0);
        assert_eq!(AddressSlot::Work.index(), 1);
    }
}
