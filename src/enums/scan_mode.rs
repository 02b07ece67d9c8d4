use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Idle,
    ScanningSmart,
    ScanningRecent,
}

impl ScanMode {
    pub const fn is_scanning(self) -> bool {
        !matches!(self, ScanMode::Idle)
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScanMode::Idle => "idle",
            ScanMode::ScanningSmart => "smart",
            ScanMode::ScanningRecent => "recent",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
