//! Image URI list with a designated main image.

use stockbook_core::{DomainError, DomainResult};

/// Image URIs of an item plus the index of the main (display) image.
///
/// Invariant: `main_index < uris.len()`, or `main_index == 0` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    uris: Vec<String>,
    main_index: usize,
}

impl ImageSet {
    /// Build a set, falling back to the first image when `main_index` is out
    /// of range.
    pub fn new(uris: Vec<String>, main_index: usize) -> Self {
        let main_index = if main_index < uris.len() { main_index } else { 0 };
        Self { uris, main_index }
    }

    pub fn from_uris(uris: Vec<String>) -> Self {
        Self::new(uris, 0)
    }

    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    pub fn main_index(&self) -> usize {
        self.main_index
    }

    pub fn main_uri(&self) -> Option<&str> {
        self.uris.get(self.main_index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    pub fn push(&mut self, uri: impl Into<String>) {
        self.uris.push(uri.into());
    }

    pub fn set_main(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.uris.len() {
            return Err(DomainError::validation(format!(
                "main image index {index} out of range ({} images)",
                self.uris.len()
            )));
        }
        self.main_index = index;
        Ok(())
    }

    /// Remove the image at `index`. Removing the main image makes the first
    /// remaining image the main one.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index >= self.uris.len() {
            return None;
        }
        let removed = self.uris.remove(index);

        if self.uris.is_empty() || index == self.main_index {
            self.main_index = 0;
        } else if index < self.main_index {
            self.main_index -= 1;
        }
        Some(removed)
    }

    /// Keep only the URIs for which `keep` returns true, visiting them in
    /// order. The main image stays the same URI when it survives, otherwise
    /// the first survivor becomes main.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let old_main = self.main_index;
        let mut new_main = None;
        let mut kept = Vec::with_capacity(self.uris.len());

        for (index, uri) in std::mem::take(&mut self.uris).into_iter().enumerate() {
            if keep(&uri) {
                if index == old_main {
                    new_main = Some(kept.len());
                }
                kept.push(uri);
            }
        }

        self.uris = kept;
        self.main_index = new_main.unwrap_or(0);
    }
}
