use serde::{Deserialize, Serialize};

/// Process-wide hook settings, passed explicitly to whoever builds the recorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    /// Whether internal calls and transaction errors are recorded. Off by default.
    #[serde(default)]
    pub enabled: bool,
}

impl HookConfig {
    pub fn enabled() -> Self {
        Self { enabled: true }
    }
}
