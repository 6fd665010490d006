//! Ordered attribute store: original key → current output key.

/// One tracked key. `original` addresses the stored value, `output` is the
/// name the value is exposed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub original: String,
    pub output: String,
}

/// Insertion-ordered set of attributes, unique by original key.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    entries: Vec<Attribute>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `key` under its own name unless it is already tracked.
    /// An existing entry keeps its position and output key.
    pub fn ensure(&mut self, key: &str) {
        if self.position(key).is_none() {
            self.entries.push(Attribute {
                original: key.to_string(),
                output: key.to_string(),
            });
        }
    }

    /// Change the output key of `original`. Returns `false` when the key is
    /// not tracked.
    pub fn rename(&mut self, original: &str, output: &str) -> bool {
        match self.position(original) {
            Some(idx) => {
                self.entries[idx].output = output.to_string();
                true
            }
            None => false,
        }
    }

    pub fn output_of(&self, original: &str) -> Option<&str> {
        self.position(original)
            .map(|idx| self.entries[idx].output.as_str())
    }

    pub fn contains(&self, original: &str) -> bool {
        self.position(original).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, original: &str) -> Option<usize> {
        self.entries.iter().position(|a| a.original == original)
    }
}
