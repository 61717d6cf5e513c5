//! Commands and input types used throughout deskpager.
//!
//! [`Command`] is the single vocabulary every input path speaks: pointer
//! events, key chords, frame ticks and direct pager actions all arrive as
//! commands and are dispatched by the [`Desktop`](crate::desktop::Desktop).
//! On the wire commands are externally tagged JSON, one per line:
//!
//! ```json
//! {"PointerMotion":{"time":1200,"x":640.0,"y":300.0}}
//! {"PointerButton":{"time":1210,"button":272,"state":"Pressed"}}
//! {"Key":"ctrl+g"}
//! {"SelectWorkspace":2}
//! "NextWorkspace"
//! {"Frame":{"time":1216}}
//! ```

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Linux evdev code of the left mouse button.
pub const BTN_LEFT: u32 = 0x110;

/// Whether a pointer button went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Modifier keys held as part of a [`KeyChord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// The "super" / logo key.
    pub logo: bool,
}

/// A key plus the modifiers held with it, e.g. `ctrl+g`.
///
/// Parsing is case-insensitive and accepts `control`, `mod1`, `super`,
/// `logo`, `mod4` and `meta` as modifier aliases.  Chords serialize back to
/// their canonical lowercase form (`ctrl+alt+shift+super+<key>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub modifiers: Modifiers,
    pub key: String,
}

impl KeyChord {
    pub fn new(modifiers: Modifiers, key: impl Into<String>) -> Self {
        Self {
            modifiers,
            key: key.into().to_lowercase(),
        }
    }

    /// `ctrl+<key>`.
    pub fn ctrl(key: char) -> Self {
        Self::new(
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
            key.to_string(),
        )
    }
}

/// Why a key chord string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyChordError {
    #[error("empty key chord")]
    Empty,
    #[error("empty component in key chord {0:?}")]
    EmptyComponent(String),
    #[error("key chord {0:?} has no key, only modifiers")]
    MissingKey(String),
    #[error("key chord {0:?} names more than one key")]
    MultipleKeys(String),
}

impl FromStr for KeyChord {
    type Err = KeyChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyChordError::Empty);
        }
        let mut modifiers = Modifiers::default();
        let mut key: Option<String> = None;
        for part in s.split('+') {
            let part = part.trim().to_lowercase();
            match part.as_str() {
                "" => return Err(KeyChordError::EmptyComponent(s.to_string())),
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "mod1" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "super" | "logo" | "mod4" | "meta" => modifiers.logo = true,
                _ => {
                    if key.is_some() {
                        return Err(KeyChordError::MultipleKeys(s.to_string()));
                    }
                    key = Some(part);
                }
            }
        }
        let key = key.ok_or_else(|| KeyChordError::MissingKey(s.to_string()))?;
        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        for (held, name) in [
            (m.ctrl, "ctrl"),
            (m.alt, "alt"),
            (m.shift, "shift"),
            (m.logo, "super"),
        ] {
            if held {
                write!(f, "{}+", name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}

impl Serialize for KeyChord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyChord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}

/// Every input the desktop reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Append a workspace to the pager.
    AddWorkspace,

    /// Make workspace `n` current.  Out-of-range indices are ignored.
    SelectWorkspace(usize),

    /// Select the next workspace, wrapping around.
    NextWorkspace,

    /// Select the previous workspace, wrapping around.
    PreviousWorkspace,

    /// Enter or leave the grid overview.
    ToggleOverview,

    /// A key chord was pressed.  Bound chords trigger their action; others
    /// are ignored.
    Key(KeyChord),

    /// Absolute pointer position on the output.
    PointerMotion { time: u32, x: f32, y: f32 },

    /// A pointer button changed state.
    PointerButton {
        time: u32,
        button: u32,
        state: ButtonState,
    },

    /// Start dragging the window under the pointer across workspaces, as a
    /// client's interactive move request would.
    BeginMove,

    /// The output presented a frame at `time` (milliseconds).
    Frame { time: u32 },

    /// Map a new window on the current workspace at the given workspace
    /// coordinates.
    MapWindow {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },

    /// Map a new background surface on the current workspace.
    MapBackground,
}
