//! Customizable keybindings.
//!
//! Each [`KeybindingMode`] has its own dispatcher. User overrides live in
//! the config file, grouped by mode:
//!
//! ```toml
//! [keybindings.Normal]
//! "J" = "NextPage"
//! "Ctrl+r" = "Refresh"
//!
//! [keybindings.Detail]
//! "Backspace" = "CloseDetail"
//! ```

mod action;
mod defaults;

pub use action::Action;

use crossterm::event::KeyEvent;
use keybinds::Keybinds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Modes with their own keybinding sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum KeybindingMode {
    /// The issue table.
    Normal,
    /// The issue detail overlay.
    Detail,
    /// Editing the search query.
    Search,
    Help,
}

impl KeybindingMode {
    pub const ALL: [KeybindingMode; 4] = [
        KeybindingMode::Normal,
        KeybindingMode::Detail,
        KeybindingMode::Search,
        KeybindingMode::Help,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            KeybindingMode::Normal => "Table",
            KeybindingMode::Detail => "Issue",
            KeybindingMode::Search => "Search",
            KeybindingMode::Help => "Help",
        }
    }
}

/// Keybinds-rs dispatchers, one per mode.
#[derive(Debug)]
pub struct Keybindings {
    bindings: HashMap<KeybindingMode, Keybinds<Action>>,
}

impl Default for Keybindings {
    fn default() -> Self {
        defaults::default_keybindings()
    }
}

impl Keybindings {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// The action bound to `event` in `mode`, if the key completes a binding.
    pub fn dispatch(&mut self, mode: KeybindingMode, event: KeyEvent) -> Option<Action> {
        self.bindings
            .get_mut(&mode)
            .and_then(|kb| kb.dispatch(event).copied())
    }

    pub fn is_sequence_ongoing(&self, mode: KeybindingMode) -> bool {
        self.bindings
            .get(&mode)
            .is_some_and(|kb| kb.is_ongoing())
    }

    /// Drop any half-typed sequences. Call when switching modes.
    pub fn reset_sequences(&mut self) {
        for kb in self.bindings.values_mut() {
            kb.reset();
        }
    }

    pub fn bind(
        &mut self,
        mode: KeybindingMode,
        key_sequence: &str,
        action: Action,
    ) -> Result<(), keybinds::Error> {
        self.bindings
            .entry(mode)
            .or_default()
            .bind(key_sequence, action)
    }

    /// Display strings for every key bound to `action` in `mode`.
    pub fn keys_for_action(&self, mode: KeybindingMode, action: Action) -> Vec<String> {
        self.bindings
            .get(&mode)
            .map(|kb| {
                kb.as_slice()
                    .iter()
                    .filter(|bind| bind.action == action)
                    .map(|bind| format_key_sequence(&bind.seq))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `(action, keys)` pairs for a mode, grouped by category.
    pub fn help_entries(&self, mode: KeybindingMode) -> Vec<(Action, Vec<String>)> {
        let mut action_keys: HashMap<Action, Vec<String>> = HashMap::new();

        if let Some(kb) = self.bindings.get(&mode) {
            for bind in kb.as_slice() {
                action_keys
                    .entry(bind.action)
                    .or_default()
                    .push(format_key_sequence(&bind.seq));
            }
        }

        let mut entries: Vec<_> = action_keys.into_iter().collect();
        entries.sort_by(|a, b| {
            a.0.category()
                .cmp(b.0.category())
                .then(a.0.description().cmp(b.0.description()))
        });
        entries
    }

    /// Apply user overrides on top of the current bindings.
    pub fn merge(&mut self, other: &KeybindingsConfig) -> Result<(), String> {
        for (mode, mode_bindings) in &other.0 {
            let kb = self.bindings.entry(*mode).or_default();
            for (key_str, action) in mode_bindings {
                kb.bind(key_str, *action)
                    .map_err(|e| format!("Invalid key '{key_str}': {e}"))?;
            }
        }
        Ok(())
    }
}

fn format_key_sequence(seq: &keybinds::KeySeq) -> String {
    seq.as_slice()
        .iter()
        .map(format_key_input)
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_key_input(input: &keybinds::KeyInput) -> String {
    let mods = input.mods();
    let mut parts = Vec::new();
    if mods.contains(keybinds::Mods::CTRL) {
        parts.push("C".to_string());
    }
    if mods.contains(keybinds::Mods::ALT) {
        parts.push("A".to_string());
    }
    if mods.contains(keybinds::Mods::SHIFT) {
        parts.push("S".to_string());
    }
    parts.push(format_key(input.key()));
    parts.join("-")
}

fn format_key(key: keybinds::Key) -> String {
    use keybinds::Key;
    match key {
        Key::Char(' ') => "Spc".to_string(),
        Key::Char(c) => c.to_string(),
        Key::Enter => "Ret".to_string(),
        Key::Esc => "Esc".to_string(),
        Key::Tab => "Tab".to_string(),
        Key::Backspace => "BS".to_string(),
        Key::Delete => "Del".to_string(),
        Key::Up => "↑".to_string(),
        Key::Down => "↓".to_string(),
        Key::Left => "←".to_string(),
        Key::Right => "→".to_string(),
        Key::PageUp => "PgU".to_string(),
        Key::PageDown => "PgD".to_string(),
        Key::Home => "Home".to_string(),
        Key::End => "End".to_string(),
        _ => "?".to_string(),
    }
}

/// User overrides as stored in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeybindingsConfig(pub HashMap<KeybindingMode, HashMap<String, Action>>);

impl KeybindingsConfig {
    /// Defaults with the overrides applied. A bad key string is logged and
    /// the remaining overrides still apply.
    pub fn to_keybindings(&self) -> Keybindings {
        let mut keybindings = Keybindings::default();
        for (mode, mode_bindings) in &self.0 {
            for (key_str, action) in mode_bindings {
                if let Err(err) = keybindings.bind(*mode, key_str, *action) {
                    warn!("ignoring keybinding '{key_str}' in {mode:?}: {err}");
                }
            }
        }
        keybindings
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
