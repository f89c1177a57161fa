use std::collections::BTreeSet;

use super::model::Column;

// ---------------------------------------------------------------------------
// Column selection: which catalog entries the next load will read
// ---------------------------------------------------------------------------

/// Selected column indices. Owned by the foreground; a load receives a copy
/// of [`selected_columns`](ColumnSelection::selected_columns) so later edits
/// never reach a running job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    selected: BTreeSet<usize>,
}

impl ColumnSelection {
    /// Flip one column; returns the new state.
    pub fn toggle(&mut self, index: usize) -> bool {
        if !self.selected.remove(&index) {
            self.selected.insert(index);
            return true;
        }
        false
    }

    pub fn set(&mut self, index: usize, selected: bool) {
        if selected {
            self.selected.insert(index);
        } else {
            self.selected.remove(&index);
        }
    }

    pub fn select_all(&mut self, catalog: &[Column]) {
        self.selected = catalog.iter().map(|c| c.index).collect();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected catalog entries, in catalog order. Indices no longer present
    /// in the catalog are ignored.
    pub fn selected_columns(&self, catalog: &[Column]) -> Vec<Column> {
        catalog
            .iter()
            .filter(|c| self.selected.contains(&c.index))
            .cloned()
            .collect()
    }

    /// Select every column whose name is in `names`. Unknown names are
    /// returned so the caller can report them.
    pub fn select_names<'a>(&mut self, catalog: &[Column], names: &[&'a str]) -> Vec<&'a str> {
        let mut unknown = Vec::new();
        for &name in names {
            let mut found = false;
            for col in catalog.iter().filter(|c| c.name == name) {
                self.selected.insert(col.index);
                found = true;
            }
            if !found {
                unknown.push(name);
            }
        }
        unknown
    }
}
