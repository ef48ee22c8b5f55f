//! Table state: sorting, filters, column visibility, order, pinning, widths
//! and pagination.
//!
//! Sorting and filtering happen on the server; this state only records what
//! the user asked for so the query layer can turn it into JQL.

pub mod columns;

pub use columns::{COLUMNS, Column, cell_text};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Error, Result};

/// Narrowest and widest column width accepted by [`TableState::resize`].
pub const MIN_WIDTH: u16 = 40;
pub const MAX_WIDTH: u16 = 800;

/// Results per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub id: String,
    #[serde(default)]
    pub desc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PinSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPinning {
    #[serde(default)]
    pub left: Vec<String>,
    #[serde(default)]
    pub right: Vec<String>,
}

/// Direction a column is sorted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// Number of pages for `total` rows; never zero.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Offset of the first row on the current page.
    pub fn start_at(&self) -> usize {
        self.page_index * self.page_size
    }

    pub fn can_next(&self, total: usize) -> bool {
        self.page_index + 1 < self.page_count(total)
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn next(&mut self, total: usize) -> bool {
        if self.can_next(total) {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.can_previous() {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn first(&mut self) {
        self.page_index = 0;
    }

    pub fn last(&mut self, total: usize) {
        self.page_index = self.page_count(total) - 1;
    }
}

/// Everything about the table the user can change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    pub sorting: Vec<SortEntry>,
    pub filters: Vec<ColumnFilter>,
    pub hidden: Vec<String>,
    /// Column order. Ids missing here follow in default order.
    pub order: Vec<String>,
    pub pinning: ColumnPinning,
    pub widths: IndexMap<String, u16>,
    pub pagination: Pagination,
}

fn known(id: &str) -> Result<&'static Column> {
    columns::find(id).ok_or_else(|| Error::UnknownColumn(id.to_string()))
}

impl TableState {
    /// Cycle a column through unsorted, ascending and descending.
    ///
    /// The column becomes the only sort key.
    pub fn toggle_sort(&mut self, id: &str) -> Result<()> {
        known(id)?;
        let next = match self.sort_direction(id) {
            None => Some(false),
            Some(SortDirection::Asc) => Some(true),
            Some(SortDirection::Desc) => None,
        };
        self.sorting = next
            .map(|desc| {
                vec![SortEntry {
                    id: id.to_string(),
                    desc,
                }]
            })
            .unwrap_or_default();
        self.pagination.first();
        Ok(())
    }

    /// Replace sorting wholesale.
    pub fn set_sorting(&mut self, sorting: Vec<SortEntry>) -> Result<()> {
        for entry in &sorting {
            known(&entry.id)?;
        }
        self.sorting = sorting;
        self.pagination.first();
        Ok(())
    }

    pub fn sort_direction(&self, id: &str) -> Option<SortDirection> {
        self.sorting.iter().find(|s| s.id == id).map(|s| {
            if s.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            }
        })
    }

    /// Filter a column to an exact value; an empty value clears the filter.
    pub fn set_filter(&mut self, id: &str, value: &str) -> Result<()> {
        known(id)?;
        self.filters.retain(|f| f.id != id);
        if !value.is_empty() {
            self.filters.push(ColumnFilter {
                id: id.to_string(),
                value: value.to_string(),
            });
        }
        self.pagination.first();
        Ok(())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        !self.hidden.iter().any(|h| h == id)
    }

    pub fn hide(&mut self, id: &str) -> Result<()> {
        known(id)?;
        if self.is_visible(id) {
            self.hidden.push(id.to_string());
        }
        Ok(())
    }

    pub fn show(&mut self, id: &str) -> Result<()> {
        known(id)?;
        self.hidden.retain(|h| h != id);
        Ok(())
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    /// Full column order: stored order first, then any columns it misses.
    pub fn column_order(&self) -> Vec<&'static str> {
        let stored = self.order.iter().filter_map(|id| columns::find(id));
        let mut order: Vec<&'static str> = Vec::with_capacity(COLUMNS.len());
        for column in stored.chain(COLUMNS) {
            if !order.contains(&column.id) {
                order.push(column.id);
            }
        }
        order
    }

    /// Move a column to a new position in the order, shifting the columns in
    /// between.
    pub fn move_column(&mut self, id: &str, to: usize) -> Result<()> {
        let column = known(id)?;
        let mut order = self.column_order();
        if let Some(from) = order.iter().position(|c| *c == column.id) {
            let item = order.remove(from);
            order.insert(to.min(order.len()), item);
        }
        self.order = order.into_iter().map(str::to_string).collect();
        Ok(())
    }

    /// Move a column one step among the visible columns of its pin group.
    pub fn shift_column(&mut self, id: &str, delta: isize) -> Result<()> {
        let column = known(id)?;
        let group = self.pinned_side(id);
        let siblings: Vec<&'static str> = self
            .column_order()
            .into_iter()
            .filter(|c| self.is_visible(c) && self.pinned_side(c) == group)
            .collect();
        let Some(position) = siblings.iter().position(|c| *c == column.id) else {
            return Ok(());
        };
        let Some(target) = position
            .checked_add_signed(delta)
            .filter(|t| *t < siblings.len())
        else {
            return Ok(());
        };

        match group {
            Some(side) => {
                let list = match side {
                    PinSide::Left => &mut self.pinning.left,
                    PinSide::Right => &mut self.pinning.right,
                };
                let a = list.iter().position(|c| c == column.id);
                let b = list.iter().position(|c| c == siblings[target]);
                if let (Some(a), Some(b)) = (a, b) {
                    list.swap(a, b);
                }
            }
            None => {
                let to = self
                    .column_order()
                    .iter()
                    .position(|c| *c == siblings[target])
                    .unwrap_or(0);
                self.move_column(column.id, to)?;
            }
        }
        Ok(())
    }

    pub fn pinned_side(&self, id: &str) -> Option<PinSide> {
        if self.pinning.left.iter().any(|c| c == id) {
            Some(PinSide::Left)
        } else if self.pinning.right.iter().any(|c| c == id) {
            Some(PinSide::Right)
        } else {
            None
        }
    }

    pub fn pin(&mut self, id: &str, side: PinSide) -> Result<()> {
        known(id)?;
        self.unpin(id)?;
        match side {
            PinSide::Left => self.pinning.left.push(id.to_string()),
            PinSide::Right => self.pinning.right.push(id.to_string()),
        }
        Ok(())
    }

    pub fn unpin(&mut self, id: &str) -> Result<()> {
        known(id)?;
        self.pinning.left.retain(|c| c != id);
        self.pinning.right.retain(|c| c != id);
        Ok(())
    }

    pub fn width(&self, id: &str) -> u16 {
        self.widths
            .get(id)
            .copied()
            .or_else(|| columns::find(id).map(|c| c.width))
            .unwrap_or(MIN_WIDTH)
    }

    /// Set a column width, clamped to [`MIN_WIDTH`]..=[`MAX_WIDTH`].
    pub fn resize(&mut self, id: &str, width: u16) -> Result<u16> {
        known(id)?;
        let width = width.clamp(MIN_WIDTH, MAX_WIDTH);
        self.widths.insert(id.to_string(), width);
        Ok(width)
    }

    /// Forget visibility, order, pinning and widths.
    pub fn reset_columns(&mut self) {
        self.hidden.clear();
        self.order.clear();
        self.pinning = ColumnPinning::default();
        self.widths.clear();
    }

    /// Visible columns in layout order: left-pinned, unpinned, right-pinned.
    pub fn visible_columns(&self) -> Vec<&'static Column> {
        let pinned = |ids: &[String]| -> Vec<&'static Column> {
            ids.iter()
                .filter_map(|id| columns::find(id))
                .filter(|c| self.is_visible(c.id))
                .collect()
        };

        let mut layout = pinned(&self.pinning.left);
        layout.extend(
            self.column_order()
                .into_iter()
                .filter(|id| self.is_visible(id) && self.pinned_side(id).is_none())
                .filter_map(columns::find),
        );
        layout.extend(pinned(&self.pinning.right));
        layout
    }
}
