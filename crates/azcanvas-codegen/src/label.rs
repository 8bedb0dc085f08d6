//! Terraform local names derived from resource names

use std::collections::HashSet;

/// Hands out unique, valid Terraform labels in call order
#[derive(Debug, Default)]
pub struct LabelAllocator {
    taken: HashSet<String>,
}

impl LabelAllocator {
    /// Create empty allocator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Label for `name`, suffixed `_2`, `_3`, ... when already taken
    pub fn allocate(&mut self, name: &str) -> String {
        let base = sanitize(name);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Lowercase, map anything outside `[a-z0-9_]` to `_`, never start with a digit
#[must_use]
pub fn sanitize(name: &str) -> String {
    let mut label: String = name
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if label.is_empty() {
        label.push_str("resource");
    } else if label.starts_with(|c: char| c.is_ascii_digit()) {
        label.insert(0, '_');
    }
    label
}
