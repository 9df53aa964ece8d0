use std::fmt;

/// Column layout of a loaded table: the names in file order and which one holds the label.
#[derive(Clone, PartialEq, Eq)]
pub struct TableHeader {
    relation_name: String,
    columns: Vec<String>,
    target_index: usize,
}

impl TableHeader {
    pub fn new(relation_name: String, columns: Vec<String>, target_index: usize) -> TableHeader {
        TableHeader {
            relation_name,
            columns,
            target_index,
        }
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn number_of_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn number_of_features(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    pub fn column_at_index(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn index_of_column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn target_name(&self) -> &str {
        &self.columns[self.target_index]
    }

    /// Feature column names, in file order, with the target removed.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.target_index)
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// Maps a feature position to its column position in the file.
    pub fn feature_index_to_column_index(&self, feature_index: usize) -> usize {
        if self.target_index > feature_index {
            feature_index
        } else {
            feature_index + 1
        }
    }
}

impl fmt::Debug for TableHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHeader")
            .field("relation_name", &self.relation_name)
            .field("target", &self.columns.get(self.target_index))
            .field("n_columns", &self.columns.len())
            .finish()
    }
}
