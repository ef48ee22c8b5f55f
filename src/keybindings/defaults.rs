//! Built-in keybindings, in keybinds-rs key string syntax.

use tracing::warn;

use super::{Action, KeybindingMode, Keybindings};

pub fn default_keybindings() -> Keybindings {
    let mut kb = Keybindings::new();
    add_normal_mode(&mut kb);
    add_detail_mode(&mut kb);
    add_search_mode(&mut kb);
    add_help_mode(&mut kb);
    kb
}

fn bind(kb: &mut Keybindings, mode: KeybindingMode, key: &str, action: Action) {
    if let Err(err) = kb.bind(mode, key, action) {
        warn!("invalid built-in keybinding '{key}': {err}");
    }
}

fn add_normal_mode(kb: &mut Keybindings) {
    use Action::*;
    use KeybindingMode::Normal;

    bind(kb, Normal, "j", NextRow);
    bind(kb, Normal, "Down", NextRow);
    bind(kb, Normal, "k", PreviousRow);
    bind(kb, Normal, "Up", PreviousRow);

    bind(kb, Normal, "n", NextPage);
    bind(kb, Normal, "PageDown", NextPage);
    bind(kb, Normal, "p", PreviousPage);
    bind(kb, Normal, "PageUp", PreviousPage);
    bind(kb, Normal, "g", FirstPage);
    bind(kb, Normal, "G", LastPage);

    bind(kb, Normal, "Left", ColumnLeft);
    bind(kb, Normal, "Right", ColumnRight);
    bind(kb, Normal, "s", CycleSort);
    bind(kb, Normal, "h", HideColumn);
    bind(kb, Normal, "H", ShowAllColumns);
    bind(kb, Normal, "<", MoveColumnLeft);
    bind(kb, Normal, ">", MoveColumnRight);
    bind(kb, Normal, "[", PinLeft);
    bind(kb, Normal, "]", PinRight);
    bind(kb, Normal, "u", Unpin);
    bind(kb, Normal, "=", WidenColumn);
    bind(kb, Normal, "-", NarrowColumn);
    bind(kb, Normal, "R", ResetColumns);

    bind(kb, Normal, "/", EditSearch);
    bind(kb, Normal, "P", CycleProject);
    bind(kb, Normal, "r", Refresh);

    bind(kb, Normal, "Enter", OpenDetail);
    bind(kb, Normal, "o", OpenInBrowser);
    bind(kb, Normal, "y", CopyUrl);

    bind(kb, Normal, "?", ToggleHelp);
    bind(kb, Normal, "q", Quit);
    bind(kb, Normal, "Ctrl+c", Quit);
}

fn add_detail_mode(kb: &mut Keybindings) {
    use Action::*;
    use KeybindingMode::Detail;

    bind(kb, Detail, "j", ScrollDown);
    bind(kb, Detail, "Down", ScrollDown);
    bind(kb, Detail, "k", ScrollUp);
    bind(kb, Detail, "Up", ScrollUp);
    bind(kb, Detail, "d", ScrollPageDown);
    bind(kb, Detail, "Space", ScrollPageDown);
    bind(kb, Detail, "PageDown", ScrollPageDown);
    bind(kb, Detail, "u", ScrollPageUp);
    bind(kb, Detail, "PageUp", ScrollPageUp);
    bind(kb, Detail, "g", ScrollTop);
    bind(kb, Detail, "G", ScrollBottom);

    bind(kb, Detail, "o", OpenInBrowser);
    bind(kb, Detail, "y", CopyUrl);

    bind(kb, Detail, "Escape", CloseDetail);
    bind(kb, Detail, "q", CloseDetail);
    bind(kb, Detail, "?", ToggleHelp);
    bind(kb, Detail, "Ctrl+c", Quit);
}

fn add_search_mode(kb: &mut Keybindings) {
    use Action::*;
    use KeybindingMode::Search;

    bind(kb, Search, "Enter", ApplySearch);
    bind(kb, Search, "Escape", CancelSearch);
    bind(kb, Search, "Backspace", SearchBackspace);
    bind(kb, Search, "Ctrl+c", Quit);
}

fn add_help_mode(kb: &mut Keybindings) {
    use Action::*;
    use KeybindingMode::Help;

    bind(kb, Help, "j", ScrollDown);
    bind(kb, Help, "Down", ScrollDown);
    bind(kb, Help, "k", ScrollUp);
    bind(kb, Help, "Up", ScrollUp);
    bind(kb, Help, "?", ToggleHelp);
    bind(kb, Help, "Escape", ToggleHelp);
    bind(kb, Help, "q", ToggleHelp);
    bind(kb, Help, "Ctrl+c", Quit);
}
