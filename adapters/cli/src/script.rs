//! Scripted input sequences replayed by the headless driver.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use collie_defence_core::{InputFrame, Signal};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(default)]
    inputs: Vec<ScriptedInput>,
}

#[derive(Debug, Deserialize)]
struct ScriptedInput {
    frame: u64,
    signals: Vec<Signal>,
}

/// Signals pressed on specific frames. Frames not listed press nothing.
#[derive(Clone, Debug, Default)]
pub(crate) struct Script {
    frames: BTreeMap<u64, InputFrame>,
}

impl Script {
    /// Presses confirm on the first frame to leave the menu.
    pub(crate) fn start_only() -> Self {
        let mut frames = BTreeMap::new();
        let _ = frames.insert(0, InputFrame::EMPTY.with(Signal::Confirm));
        Self { frames }
    }

    /// Reads a script TOML file with `[[inputs]]` entries.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse script {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let file: ScriptFile = toml::from_str(text)?;
        let mut frames: BTreeMap<u64, InputFrame> = BTreeMap::new();
        for input in file.inputs {
            let entry = frames.entry(input.frame).or_default();
            *entry = input
                .signals
                .iter()
                .fold(*entry, |frame, signal| frame.with(*signal));
        }
        Ok(Self { frames })
    }

    /// Input for `frame`.
    pub(crate) fn input_at(&self, frame: u64) -> InputFrame {
        self.frames.get(&frame).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collie_defence_core::InputSource;

    #[test]
    fn repeated_frames_merge_their_signals() {
        let script = Script::parse(
            r#"
[[inputs]]
frame = 3
signals = ["cancel"]

[[inputs]]
frame = 3
signals = ["right", "down"]
"#,
        )
        .expect("valid script");

        let input = script.input_at(3);
        assert!(input.pressed(Signal::Cancel));
        assert!(input.pressed(Signal::Right));
        assert!(input.pressed(Signal::Down));
        assert!(!input.pressed(Signal::Confirm));
        assert_eq!(script.input_at(4), InputFrame::EMPTY);
    }

    #[test]
    fn unknown_signal_is_rejected() {
        let error = Script::parse("[[inputs]]\nframe = 0\nsignals = [\"jump\"]\n");
        assert!(error.is_err());
    }
}
