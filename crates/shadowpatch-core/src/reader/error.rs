use thiserror::Error as ThisError;

///
/// DocumentError
///
/// A malformed incoming document. `path` locates the offending value
/// (`child.items[2].num`); empty means the document root.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{}", self.render())]
pub struct DocumentError {
    pub path: String,
    pub message: String,
}

impl DocumentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            message: message.into(),
        }
    }

    /// Prepend a field segment to the error path.
    #[must_use]
    pub fn with_field(self, field: impl AsRef<str>) -> Self {
        self.with_segment(field.as_ref())
    }

    /// Prepend an index segment to the error path.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        self.with_segment(&format!("[{index}]"))
    }

    fn with_segment(mut self, segment: &str) -> Self {
        self.path = if self.path.is_empty() {
            segment.to_string()
        } else if self.path.starts_with('[') {
            format!("{segment}{}", self.path)
        } else {
            format!("{segment}.{}", self.path)
        };

        self
    }

    fn render(&self) -> String {
        if self.path.is_empty() {
            format!("invalid document: {}", self.message)
        } else {
            format!("invalid document at {}: {}", self.path, self.message)
        }
    }
}
