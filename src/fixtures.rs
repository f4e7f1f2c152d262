//! Sample catalogue, members and loans inserted by the setup.
//!
//! The whole object graph is built in memory first with client-generated
//! ids, so loans can point at books, copies and members before anything is
//! persisted.

use anyhow::{ensure, Context};
use bson::{oid::ObjectId, Document};

use crate::modules::books::models::{Author, Book, BookCopy, CopyStatus};
use crate::modules::loans::consistency;
use crate::modules::loans::models::{Loan, LoanStatus};
use crate::modules::members::models::{Address, Member};
use crate::modules::{books, loans, members};
use crate::utils::{self, date};

/// Complete fixture graph, ready to persist.
#[derive(Debug, Clone)]
pub struct LibraryFixtures {
    pub books: Vec<Book>,
    pub members: Vec<Member>,
    pub loans: Vec<Loan>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn springfield(street: &str) -> Address {
    Address {
        street: street.to_string(),
        city: "Springfield".to_string(),
        zip: "12345".to_string(),
    }
}

impl LibraryFixtures {
    pub fn build() -> anyhow::Result<Self> {
        let orwell = Author::new("George Orwell", "British");
        let rowling = Author::new("J.K. Rowling", "British");
        let king = Author::new("Stephen King", "American");

        let nineteen_eighty_four = Book {
            id: ObjectId::new(),
            isbn: "978-0451524935".to_string(),
            title: "1984".to_string(),
            publication_year: 1949,
            publisher: "Signet Classics".to_string(),
            genre: strings(&["Dystopian", "Political fiction"]),
            authors: vec![orwell],
            copies: vec![
                BookCopy::new(date(2015, 3, 10)?, CopyStatus::Available, "Shelf B2"),
                BookCopy::new(date(2018, 7, 15)?, CopyStatus::Available, "Shelf B2"),
            ],
        };

        let philosophers_stone = Book {
            id: ObjectId::new(),
            isbn: "978-0747532743".to_string(),
            title: "Harry Potter and the Philosopher's Stone".to_string(),
            publication_year: 1997,
            publisher: "Bloomsbury".to_string(),
            genre: strings(&["Fantasy", "Adventure"]),
            authors: vec![rowling],
            copies: vec![
                BookCopy::new(date(2010, 5, 22)?, CopyStatus::Available, "Shelf C1"),
                BookCopy::new(date(2019, 11, 5)?, CopyStatus::OnLoan, "Shelf C1"),
            ],
        };

        let it = Book {
            id: ObjectId::new(),
            isbn: "978-1501142970".to_string(),
            title: "It".to_string(),
            publication_year: 1986,
            publisher: "Scribner".to_string(),
            genre: strings(&["Horror", "Thriller"]),
            authors: vec![king],
            copies: vec![BookCopy::new(
                date(2017, 9, 1)?,
                CopyStatus::Available,
                "Shelf A3",
            )],
        };

        let alice = Member {
            id: ObjectId::new(),
            member_id: "M1001".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Johnson".to_string(),
            email: "alice.johnson@example.com".to_string(),
            phone: "+1555123456".to_string(),
            address: springfield("123 Oak Street"),
            membership_start: date(2020, 1, 15)?,
            active: true,
        };

        let bob = Member {
            id: ObjectId::new(),
            member_id: "M1002".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Williams".to_string(),
            email: "bob.williams@example.com".to_string(),
            phone: "+1555234567".to_string(),
            address: springfield("456 Maple Avenue"),
            membership_start: date(2021, 3, 22)?,
            active: true,
        };

        let current_loan = Loan {
            id: ObjectId::new(),
            book_id: philosophers_stone.id,
            copy_id: philosophers_stone.copies[1].copy_id,
            member_id: alice.id,
            loan_date: date(2023, 1, 5)?,
            due_date: date(2023, 1, 19)?,
            return_date: None,
            status: LoanStatus::OnLoan,
        };

        let returned_loan = Loan {
            id: ObjectId::new(),
            book_id: nineteen_eighty_four.id,
            copy_id: nineteen_eighty_four.copies[0].copy_id,
            member_id: bob.id,
            loan_date: date(2022, 12, 10)?,
            due_date: date(2022, 12, 24)?,
            return_date: Some(date(2022, 12, 20)?),
            status: LoanStatus::Returned,
        };

        Ok(Self {
            books: vec![nineteen_eighty_four, philosophers_stone, it],
            members: vec![alice, bob],
            loans: vec![current_loan, returned_loan],
        })
    }

    /// Shape checks per record plus reference and loan/copy agreement across
    /// collections.
    pub fn validate(&self) -> anyhow::Result<()> {
        for book in &self.books {
            book.validate()?;
        }
        for member in &self.members {
            member.validate()?;
        }
        for loan in &self.loans {
            loan.validate()?;
            ensure!(
                self.members.iter().any(|member| member.id == loan.member_id),
                "loan {} references unknown member {}",
                loan.id,
                loan.member_id
            );
        }

        let findings = consistency::check(&self.books, &self.loans);
        if let Some(first) = findings.first() {
            anyhow::bail!(
                "fixtures are inconsistent ({} finding(s)): {}",
                findings.len(),
                first
            );
        }
        Ok(())
    }

    /// Encoded documents per collection, in insertion order.
    pub fn documents(&self) -> anyhow::Result<Vec<(&'static str, Vec<Document>)>> {
        Ok(vec![
            (
                books::COLLECTION,
                utils::to_documents(&self.books).context("failed to encode books")?,
            ),
            (
                members::COLLECTION,
                utils::to_documents(&self.members).context("failed to encode members")?,
            ),
            (
                loans::COLLECTION,
                utils::to_documents(&self.loans).context("failed to encode loans")?,
            ),
        ])
    }
}
