//! Well-known primary-store keys.

pub const PROFILES_KEY: &str = "desktop-profiles";
pub const ACTIVE_PROFILE_KEY: &str = "active-profile-name";

/// Widget keys included in a backup unless the caller names others.
pub const WIDGET_DATA_KEYS: &[&str] = &[
    "work-list-tasks",
    "spinner-options",
    "notepad-content-html",
    "image-carousel-images",
    "tictactoe-players",
    "tictactoe-score",
    "global-clocks-selection",
    "attendance-records",
    "traffic-light-state",
    "scoreboard-players",
    "toolbar-hidden",
    "i18nextLng",
    "profile-order",
    "widgets-view-mode",
];
