use anyhow::ensure;
use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Shelf state of a physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyStatus {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "on loan")]
    OnLoan,
}

impl CopyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::OnLoan => "on loan",
        }
    }
}

/// Author embedded in a book. Not shared between books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub author_id: ObjectId,
    pub name: String,
    pub nationality: String,
}

impl Author {
    pub fn new(name: &str, nationality: &str) -> Self {
        Self {
            author_id: ObjectId::new(),
            name: name.to_string(),
            nationality: nationality.to_string(),
        }
    }
}

/// One physical copy of a book, tracked individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCopy {
    pub copy_id: ObjectId,
    pub acquisition_date: DateTime,
    pub status: CopyStatus,
    pub location: String,
}

impl BookCopy {
    pub fn new(acquisition_date: DateTime, status: CopyStatus, location: &str) -> Self {
        Self {
            copy_id: ObjectId::new(),
            acquisition_date,
            status,
            location: location.to_string(),
        }
    }
}

/// A title in the catalogue with its embedded authors and copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Natural key; unique across the collection.
    pub isbn: String,
    pub title: String,
    pub publication_year: i32,
    pub publisher: String,
    pub genre: Vec<String>,
    pub authors: Vec<Author>,
    pub copies: Vec<BookCopy>,
}

impl Book {
    pub fn copy(&self, copy_id: ObjectId) -> Option<&BookCopy> {
        self.copies.iter().find(|copy| copy.copy_id == copy_id)
    }

    /// Shape checks applied before the book is persisted.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.isbn.trim().is_empty(), "book {} has an empty isbn", self.id);
        ensure!(!self.title.trim().is_empty(), "book {} has an empty title", self.isbn);
        ensure!(
            !self.publisher.trim().is_empty(),
            "book {} has an empty publisher",
            self.isbn
        );
        ensure!(!self.authors.is_empty(), "book {} has no authors", self.isbn);
        ensure!(
            self.authors.iter().all(|author| !author.name.trim().is_empty()),
            "book {} has an author without a name",
            self.isbn
        );

        for (position, copy) in self.copies.iter().enumerate() {
            ensure!(
                !self.copies[..position]
                    .iter()
                    .any(|earlier| earlier.copy_id == copy.copy_id),
                "book {} lists copy {} twice",
                self.isbn,
                copy.copy_id
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book {
            id: ObjectId::new(),
            isbn: "978-1501142970".to_string(),
            title: "It".to_string(),
            publication_year: 1986,
            publisher: "Scribner".to_string(),
            genre: vec!["Horror".to_string()],
            authors: vec![Author::new("Stephen King", "American")],
            copies: vec![BookCopy::new(DateTime::now(), CopyStatus::Available, "Shelf A3")],
        }
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let document = bson::to_document(&sample()).unwrap();
        assert!(document.contains_key("_id"));
        assert_eq!(document.get_i32("publicationYear").unwrap(), 1986);
        let copy = document.get_array("copies").unwrap()[0].as_document().unwrap();
        assert_eq!(copy.get_str("status").unwrap(), "available");
        assert!(copy.contains_key("acquisitionDate"));
        let author = document.get_array("authors").unwrap()[0].as_document().unwrap();
        assert!(author.contains_key("authorId"));
    }

    #[test]
    fn on_loan_status_uses_spaced_name() {
        let encoded = bson::to_bson(&CopyStatus::OnLoan).unwrap();
        assert_eq!(encoded.as_str(), Some(CopyStatus::OnLoan.as_str()));
    }

    #[test]
    fn duplicate_copy_ids_are_rejected() {
        let mut book = sample();
        book.copies.push(book.copies[0].clone());
        let error = book.validate().unwrap_err();
        assert!(error.to_string().contains("twice"));
    }

    #[test]
    fn book_without_authors_is_rejected() {
        let mut book = sample();
        book.authors.clear();
        assert!(book.validate().is_err());
        assert!(sample().validate().is_ok());
    }
}
