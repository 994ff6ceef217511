use crate::{
    core::column::KeyPath,
    error::{EncodeError, EncodeResult},
};

/// Collects the cells of the row currently being walked.
#[derive(Debug, Default)]
pub struct RowAssembler {
    cells: Vec<Option<String>>,
}

impl RowAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `text` in column `index`.
    ///
    /// A second leaf landing on the same column within one row is rejected,
    /// as it would silently drop data.
    pub fn put(&mut self, index: usize, text: String, key_path: &KeyPath) -> EncodeResult<()> {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, None);
        }

        let cell = &mut self.cells[index];
        if cell.is_some() {
            return Err(EncodeError::Structural {
                key_path: key_path.to_string(),
                message: "key-path produced more than one value in the same row".to_string(),
            });
        }
        *cell = Some(text);
        Ok(())
    }

    /// Materializes the row with exactly `width` cells, unfilled columns being
    /// empty, and resets the assembler for the next row.
    pub fn finish(&mut self, width: usize) -> Vec<String> {
        let mut cells = std::mem::take(&mut self.cells);
        cells.resize(width, None);
        cells.into_iter().map(Option::unwrap_or_default).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cells_default_to_empty_text() {
        let mut row = RowAssembler::new();
        row.put(2, "c".to_string(), &KeyPath::new()).unwrap();
        row.put(0, "a".to_string(), &KeyPath::new()).unwrap();

        assert_eq!(row.finish(4), vec!["a", "", "c", ""]);
    }

    #[test]
    fn finish_resets_state() {
        let mut row = RowAssembler::new();
        row.put(0, "a".to_string(), &KeyPath::new()).unwrap();
        assert!(!row.is_empty());

        row.finish(1);
        assert!(row.is_empty());
        assert_eq!(row.finish(2), vec!["", ""]);
    }

    #[test]
    fn duplicate_column_in_one_row_is_structural_error() {
        let mut row = RowAssembler::new();
        let key_path: KeyPath = ["id"].into_iter().collect();
        row.put(0, "1".to_string(), &key_path).unwrap();

        let err = row.put(0, "2".to_string(), &key_path).unwrap_err();
        assert!(matches!(err, EncodeError::Structural { ref key_path, .. } if key_path == "id"));
    }
}
