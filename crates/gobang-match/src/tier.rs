use std::fmt;

/// Lowest score of the `High` tier.
pub const HIGH_THRESHOLD: i64 = 2000;

/// Lowest score of the `Super` tier.
pub const SUPER_THRESHOLD: i64 = 3000;

/// Score bracket a waiting user is queued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Below 2000.
    Normal,
    /// 2000 up to 2999.
    High,
    /// 3000 and above.
    Super,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Normal, Tier::High, Tier::Super];

    pub fn for_score(score: i64) -> Self {
        if score < HIGH_THRESHOLD {
            Self::Normal
        } else if score < SUPER_THRESHOLD {
            Self::High
        } else {
            Self::Super
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::High => 1,
            Self::Super => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::Super => write!(f, "super"),
        }
    }
}
