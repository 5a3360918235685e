//! Class label lookup.
//!
//! This module loads the ordered list of class names that maps a predicted
//! class index to a human-readable label. The table is loaded once at
//! startup and stays immutable for the process lifetime.

use crate::core::ClassifyError;
use std::path::Path;

/// An ordered, index-addressable table of class names.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Creates a label table from an in-memory list of names.
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Reads a label table from a text file, one class name per line.
    ///
    /// Line order defines class indices. Empty lines are preserved so the
    /// indices stay aligned with the file.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, ClassifyError> {
        let content = std::fs::read_to_string(path).map_err(|e| ClassifyError::InvalidInput {
            message: format!("Failed to read label table from '{}': {}", path.display(), e),
        })?;
        Ok(Self::from_labels(
            content.lines().map(|s| s.to_string()).collect(),
        ))
    }

    /// Looks up the class name for a predicted index.
    ///
    /// # Errors
    ///
    /// Returns `LabelOutOfRange` if the index has no entry.
    pub fn get(&self, index: usize) -> Result<&str, ClassifyError> {
        self.labels
            .get(index)
            .map(|s| s.as_str())
            .ok_or(ClassifyError::LabelOutOfRange {
                index,
                len: self.labels.len(),
            })
    }

    /// Returns the number of labels in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Checks if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_file_preserves_line_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tench").unwrap();
        writeln!(file, "goldfish").unwrap();
        writeln!(file, "great white shark").unwrap();

        let table = LabelTable::from_file(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0).unwrap(), "tench");
        assert_eq!(table.get(2).unwrap(), "great white shark");
    }

    #[test]
    fn test_get_out_of_range() {
        let table = LabelTable::from_labels(vec!["cat".to_string()]);
        let err = table.get(1).unwrap_err();
        match err {
            ClassifyError::LabelOutOfRange { index, len } => {
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("expected LabelOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_from_nonexistent_file() {
        let result = LabelTable::from_file(Path::new("/nonexistent/labels.txt"));
        assert!(result.is_err());
    }
}
