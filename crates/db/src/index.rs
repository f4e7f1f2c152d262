//! Backend-neutral index definitions.

use bson::{doc, Bson, Document};

/// Direction or type of a single index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Ascending,
    Text,
}

impl IndexKind {
    fn as_bson(self) -> Bson {
        match self {
            IndexKind::Ascending => Bson::Int32(1),
            IndexKind::Text => Bson::String("text".to_string()),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            IndexKind::Ascending => "1",
            IndexKind::Text => "text",
        }
    }
}

/// Index definition applied to one collection.
///
/// Key order is significant for compound indexes. Text indexes carry per-field
/// relevance weights; fields without an explicit weight count as 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: Option<String>,
    pub keys: Vec<(String, IndexKind)>,
    pub unique: bool,
    pub weights: Vec<(String, i32)>,
}

impl IndexSpec {
    /// Single-field ascending index.
    pub fn ascending(field: &str) -> Self {
        Self::compound(&[field])
    }

    /// Ascending compound index over `fields`, in order.
    pub fn compound(fields: &[&str]) -> Self {
        Self {
            name: None,
            keys: fields
                .iter()
                .map(|field| (field.to_string(), IndexKind::Ascending))
                .collect(),
            unique: false,
            weights: Vec::new(),
        }
    }

    /// Named text index over the weighted fields.
    pub fn text(name: &str, weighted: &[(&str, i32)]) -> Self {
        Self {
            name: Some(name.to_string()),
            keys: weighted
                .iter()
                .map(|(field, _)| (field.to_string(), IndexKind::Text))
                .collect(),
            unique: false,
            weights: weighted
                .iter()
                .map(|(field, weight)| (field.to_string(), *weight))
                .collect(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Explicit name, or the `field_1_other_1` form MongoDB derives.
    pub fn name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.keys
            .iter()
            .map(|(field, kind)| format!("{field}_{}", kind.suffix()))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn is_text(&self) -> bool {
        self.keys.iter().any(|(_, kind)| *kind == IndexKind::Text)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|(field, _)| field.as_str())
    }

    pub fn keys_document(&self) -> Document {
        let mut keys = Document::new();
        for (field, kind) in &self.keys {
            keys.insert(field.clone(), kind.as_bson());
        }
        keys
    }

    pub fn weights_document(&self) -> Option<Document> {
        if self.weights.is_empty() {
            return None;
        }
        let mut weights = doc! {};
        for (field, weight) in &self.weights {
            weights.insert(field.clone(), *weight);
        }
        Some(weights)
    }

    pub fn weight(&self, field: &str) -> i32 {
        self.weights
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, weight)| *weight)
            .unwrap_or(1)
    }
}
