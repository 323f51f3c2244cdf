use serde::{Deserialize, Serialize};

/// Track state enumeration for object tracking lifecycle.
///
/// ```text
/// Tentative --(confirm_after consecutive matches)--> Confirmed
/// Tentative --(miss)--> Deleted
/// Confirmed --(miss)--> Lost --(match)--> Confirmed
/// Lost --(more than max_age misses)--> Deleted
/// ```
///
/// `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackState {
    /// Newly created track, not yet confirmed
    #[default]
    Tentative,
    /// Matched often enough to be trusted
    Confirmed,
    /// Missed recent frames but still within max age
    Lost,
    /// Expired; removed from the active set on the next purge
    Deleted,
}

impl TrackState {
    /// State after a successful match. `hits` counts consecutive matches,
    /// including this one. Returns `None` for `Deleted`.
    pub fn on_match(self, hits: u32, confirm_after: u32) -> Option<Self> {
        match self {
            Self::Tentative if hits >= confirm_after => Some(Self::Confirmed),
            Self::Tentative => Some(Self::Tentative),
            Self::Confirmed | Self::Lost => Some(Self::Confirmed),
            Self::Deleted => None,
        }
    }

    /// State after a frame without a match. `misses` counts frames since the
    /// last match, including this one. Returns `None` for `Deleted`.
    pub fn on_miss(self, misses: u32, max_age: u32) -> Option<Self> {
        match self {
            Self::Tentative => Some(Self::Deleted),
            Self::Confirmed | Self::Lost if misses > max_age => Some(Self::Deleted),
            Self::Confirmed | Self::Lost => Some(Self::Lost),
            Self::Deleted => None,
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::Deleted
    }
}
