//! Bindable actions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Everything a key can be bound to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum Action {
    // === Rows ===
    NextRow,
    PreviousRow,

    // === Pages ===
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,

    // === Columns ===
    /// Select the column to the left
    ColumnLeft,
    /// Select the column to the right
    ColumnRight,
    /// Cycle the selected column through ascending, descending, unsorted
    CycleSort,
    HideColumn,
    ShowAllColumns,
    MoveColumnLeft,
    MoveColumnRight,
    PinLeft,
    PinRight,
    Unpin,
    WidenColumn,
    NarrowColumn,
    ResetColumns,

    // === Query ===
    EditSearch,
    ApplySearch,
    CancelSearch,
    SearchBackspace,
    CycleProject,
    Refresh,

    // === Issue ===
    OpenDetail,
    CloseDetail,
    OpenInBrowser,
    CopyUrl,

    // === Scrolling ===
    ScrollDown,
    ScrollUp,
    ScrollPageDown,
    ScrollPageUp,
    ScrollTop,
    ScrollBottom,

    // === Application ===
    ToggleHelp,
    Quit,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::NextRow => "Next issue",
            Action::PreviousRow => "Previous issue",

            Action::NextPage => "Next page",
            Action::PreviousPage => "Previous page",
            Action::FirstPage => "First page",
            Action::LastPage => "Last page",

            Action::ColumnLeft => "Select column to the left",
            Action::ColumnRight => "Select column to the right",
            Action::CycleSort => "Cycle sort on column",
            Action::HideColumn => "Hide column",
            Action::ShowAllColumns => "Show all columns",
            Action::MoveColumnLeft => "Move column left",
            Action::MoveColumnRight => "Move column right",
            Action::PinLeft => "Pin column left",
            Action::PinRight => "Pin column right",
            Action::Unpin => "Unpin column",
            Action::WidenColumn => "Widen column",
            Action::NarrowColumn => "Narrow column",
            Action::ResetColumns => "Reset column layout",

            Action::EditSearch => "Edit search (JQL)",
            Action::ApplySearch => "Apply search",
            Action::CancelSearch => "Discard search edit",
            Action::SearchBackspace => "Delete character",
            Action::CycleProject => "Next project",
            Action::Refresh => "Reload page",

            Action::OpenDetail => "Open issue",
            Action::CloseDetail => "Close issue",
            Action::OpenInBrowser => "Open in browser",
            Action::CopyUrl => "Copy issue URL",

            Action::ScrollDown => "Scroll down",
            Action::ScrollUp => "Scroll up",
            Action::ScrollPageDown => "Scroll page down",
            Action::ScrollPageUp => "Scroll page up",
            Action::ScrollTop => "Scroll to top",
            Action::ScrollBottom => "Scroll to bottom",

            Action::ToggleHelp => "Toggle help",
            Action::Quit => "Quit",
        }
    }

    /// Heading the action is listed under in help.
    pub fn category(&self) -> &'static str {
        match self {
            Action::NextRow
            | Action::PreviousRow
            | Action::NextPage
            | Action::PreviousPage
            | Action::FirstPage
            | Action::LastPage => "Navigation",

            Action::ColumnLeft
            | Action::ColumnRight
            | Action::CycleSort
            | Action::HideColumn
            | Action::ShowAllColumns
            | Action::MoveColumnLeft
            | Action::MoveColumnRight
            | Action::PinLeft
            | Action::PinRight
            | Action::Unpin
            | Action::WidenColumn
            | Action::NarrowColumn
            | Action::ResetColumns => "Columns",

            Action::EditSearch
            | Action::ApplySearch
            | Action::CancelSearch
            | Action::SearchBackspace
            | Action::CycleProject
            | Action::Refresh => "Query",

            Action::OpenDetail
            | Action::CloseDetail
            | Action::OpenInBrowser
            | Action::CopyUrl => "Issue",

            Action::ScrollDown
            | Action::ScrollUp
            | Action::ScrollPageDown
            | Action::ScrollPageUp
            | Action::ScrollTop
            | Action::ScrollBottom => "Scroll",

            Action::ToggleHelp | Action::Quit => "Application",
        }
    }
}
