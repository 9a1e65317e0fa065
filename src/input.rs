use std::str::FromStr;

use anyhow::{anyhow, Context};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for a keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
}

impl KeyCode {
    /// Parses names such as `"Space"`, `"b"` or `"B"`. Letters are case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(' '), None) => Some(Self::Named(NamedKey::Space)),
            (Some(ch), None) if ch.is_ascii_alphanumeric() => {
                Some(Self::Character(ch.to_ascii_uppercase()))
            }
            _ => None,
        }
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" | "space" => Space,
        "Escape" | "Esc" => Escape,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Friendly names for the non-character keys the scene reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    /// Closes the window.
    Escape,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Discrete commands understood by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Jump,
    Launch,
    Land,
    CycleCamera,
}

impl Command {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        Some(match key {
            KeyCode::Named(NamedKey::Space) => Self::Jump,
            KeyCode::Character(ch) => match ch.to_ascii_lowercase() {
                'w' => Self::MoveForward,
                's' => Self::MoveBack,
                'a' => Self::MoveLeft,
                'd' => Self::MoveRight,
                'b' => Self::Launch,
                'r' => Self::Land,
                'c' => Self::CycleCamera,
                _ => return None,
            },
            KeyCode::Named(_) => return None,
        })
    }
}

/// Key press scheduled for replay, written as `key@frame` (`b@0`, `space@30`).
///
/// The key is delivered before the given frame is advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedKey {
    pub key: KeyCode,
    pub frame: u32,
}

impl FromStr for ScriptedKey {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        let (name, frame) = value
            .split_once('@')
            .ok_or_else(|| anyhow!("expected KEY@FRAME, got {value:?}"))?;
        let key = KeyCode::from_name(name).ok_or_else(|| anyhow!("unknown key {name:?}"))?;
        let frame = frame
            .trim()
            .parse()
            .with_context(|| format!("invalid frame in {value:?}"))?;
        Ok(Self { key, frame })
    }
}

/// Pointer position and viewport size, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    pointer: Vec2,
    viewport: (u32, u32),
}

impl InputState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pointer: Vec2::ZERO,
            viewport: (width.max(1), height.max(1)),
        }
    }

    pub fn set_pointer_position(&mut self, position: Vec2) {
        self.pointer = position;
    }

    pub fn pointer_position(&self) -> Vec2 {
        self.pointer
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// Pointer in normalized device coordinates, `y` pointing up.
    pub fn pointer_ndc(&self) -> Vec2 {
        let (width, height) = self.viewport;
        Vec2::new(
            self.pointer.x / width as f32 * 2.0 - 1.0,
            -(self.pointer.y / height as f32) * 2.0 + 1.0,
        )
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}
