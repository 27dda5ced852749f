// ABOUTME: Animation hints handed to the host's render driver.
// ABOUTME: The host interpolates; tilegrid only picks duration and easing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

/// Duration and easing of an animated layout pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub duration: Duration,
    pub easing: Easing,
}

impl Transition {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(250);

    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing }
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION, Easing::default())
    }
}
