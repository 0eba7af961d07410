//! Ordered list of output pages drawn from the loaded source files

use crate::files::display_name;
use pdfedit_core::PageRef;
use std::path::{Path, PathBuf};

/// Identity of a page-list entry, stable across removals and reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub id: EntryId,
    /// Index into the source list.
    pub source: usize,
    /// Zero-based page within the source.
    pub page: usize,
}

#[derive(Debug, Default)]
pub struct PageList {
    sources: Vec<PathBuf>,
    entries: Vec<PageEntry>,
    selected: Option<usize>,
    next_id: u64,
}

impl PageList {
    /// Append one entry per page of `path`. Returns the number of entries added.
    pub fn add_document(&mut self, path: &Path, page_count: usize) -> usize {
        let source = match self.sources.iter().position(|known| known == path) {
            Some(index) => index,
            None => {
                self.sources.push(path.to_path_buf());
                self.sources.len() - 1
            }
        };

        for page in 0..page_count {
            let id = EntryId(self.next_id);
            self.next_id += 1;
            self.entries.push(PageEntry { id, source, page });
        }
        if self.selected.is_none() && !self.entries.is_empty() {
            self.selected = Some(0);
        }
        page_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn source_path(&self, entry: &PageEntry) -> &Path {
        &self.sources[entry.source]
    }

    pub fn label(&self, index: usize) -> String {
        match self.entries.get(index) {
            Some(entry) => format!(
                "{}. {} (page {})",
                index + 1,
                display_name(self.source_path(entry)),
                entry.page + 1
            ),
            None => String::new(),
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&PageEntry> {
        self.selected.and_then(|index| self.entries.get(index))
    }

    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.selected = Some(index);
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(index) = self.selected {
            self.selected = Some(index.saturating_sub(1));
        }
    }

    pub fn select_next(&mut self) {
        if let Some(index) = self.selected {
            if index + 1 < self.entries.len() {
                self.selected = Some(index + 1);
            }
        }
    }

    /// Remove the selected entry and select its successor (or the new last entry).
    pub fn remove_selected(&mut self) -> Option<PageEntry> {
        let index = self.selected?;
        let removed = self.entries.remove(index);
        self.selected = if self.entries.is_empty() {
            None
        } else {
            Some(index.min(self.entries.len() - 1))
        };
        Some(removed)
    }

    /// Output position of an entry.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Output pages, in list order.
    pub fn page_refs(&self) -> Vec<PageRef> {
        self.entries
            .iter()
            .map(|entry| PageRef::new(entry.source, entry.page))
            .collect()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
        self.entries.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list_with(docs: &[(&str, usize)]) -> PageList {
        let mut list = PageList::default();
        for (name, pages) in docs {
            list.add_document(Path::new(name), *pages);
        }
        list
    }

    #[test]
    fn test_add_documents_creates_entry_per_page() {
        let list = list_with(&[("a.pdf", 2), ("b.pdf", 3)]);
        assert_eq!(list.len(), 5);
        assert_eq!(list.sources().len(), 2);
        assert_eq!(list.selected_index(), Some(0));
        assert_eq!(
            list.page_refs(),
            vec![
                PageRef::new(0, 0),
                PageRef::new(0, 1),
                PageRef::new(1, 0),
                PageRef::new(1, 1),
                PageRef::new(1, 2),
            ]
        );
    }

    #[test]
    fn test_same_file_twice_reuses_source() {
        let list = list_with(&[("a.pdf", 1), ("a.pdf", 1)]);
        assert_eq!(list.sources().len(), 1);
        assert_eq!(list.page_refs(), vec![PageRef::new(0, 0), PageRef::new(0, 0)]);
        assert_ne!(list.entries()[0].id, list.entries()[1].id);
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut list = list_with(&[("a.pdf", 3)]);
        list.select_previous();
        assert_eq!(list.selected_index(), Some(0));
        list.select_next();
        list.select_next();
        list.select_next();
        assert_eq!(list.selected_index(), Some(2));
        list.select(10);
        assert_eq!(list.selected_index(), Some(2));
    }

    #[test]
    fn test_remove_selects_successor() {
        let mut list = list_with(&[("a.pdf", 3)]);
        list.select(1);
        let removed = list.remove_selected().unwrap();
        assert_eq!(removed.page, 1);
        assert_eq!(list.selected().unwrap().page, 2);

        list.remove_selected();
        assert_eq!(list.selected().unwrap().page, 0);
        list.remove_selected();
        assert!(list.is_empty());
        assert_eq!(list.remove_selected(), None);
    }

    #[test]
    fn test_ids_follow_entries_after_removal() {
        let mut list = list_with(&[("a.pdf", 3)]);
        let last = list.entries()[2].id;
        assert_eq!(list.position(last), Some(2));

        list.select(0);
        let removed = list.remove_selected().unwrap();
        assert_eq!(list.position(last), Some(1));
        assert_eq!(list.position(removed.id), None);
    }

    #[test]
    fn test_label_is_one_based() {
        let list = list_with(&[("/docs/report.pdf", 2)]);
        assert_eq!(list.label(1), "2. report.pdf (page 2)");
    }
}
