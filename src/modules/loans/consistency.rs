//! Cross-collection agreement between loans and the copies they reference.
//!
//! Nothing in the database enforces that a copy marked `on loan` has exactly
//! one open loan, so the fixtures are checked before insertion and the stored
//! data is audited after.

use std::collections::HashMap;
use std::fmt;

use bson::oid::ObjectId;

use super::models::Loan;
use crate::modules::books::models::{Book, CopyStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// The loan names a book or copy that does not exist, or a copy of another book.
    UnknownCopy {
        loan: ObjectId,
        book: ObjectId,
        copy: ObjectId,
    },
    /// An open loan whose copy is not marked `on loan`.
    CopyNotOnLoan { loan: ObjectId, copy: ObjectId },
    /// A copy marked `on loan` with no open loan referencing it.
    MissingOpenLoan { book: String, copy: ObjectId },
    MultipleOpenLoans { copy: ObjectId, count: usize },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::UnknownCopy { loan, book, copy } => {
                write!(f, "loan {loan} references copy {copy} not held by book {book}")
            }
            Inconsistency::CopyNotOnLoan { loan, copy } => {
                write!(f, "open loan {loan} references copy {copy} which is not on loan")
            }
            Inconsistency::MissingOpenLoan { book, copy } => {
                write!(f, "copy {copy} of {book} is on loan without an open loan")
            }
            Inconsistency::MultipleOpenLoans { copy, count } => {
                write!(f, "copy {copy} has {count} open loans")
            }
        }
    }
}

pub fn check(books: &[Book], loans: &[Loan]) -> Vec<Inconsistency> {
    let mut findings = Vec::new();
    let mut open_per_copy: HashMap<ObjectId, usize> = HashMap::new();

    for loan in loans {
        let copy = books
            .iter()
            .find(|book| book.id == loan.book_id)
            .and_then(|book| book.copy(loan.copy_id));

        let Some(copy) = copy else {
            findings.push(Inconsistency::UnknownCopy {
                loan: loan.id,
                book: loan.book_id,
                copy: loan.copy_id,
            });
            continue;
        };

        if loan.is_open() {
            *open_per_copy.entry(loan.copy_id).or_default() += 1;
            if copy.status != CopyStatus::OnLoan {
                findings.push(Inconsistency::CopyNotOnLoan {
                    loan: loan.id,
                    copy: loan.copy_id,
                });
            }
        }
    }

    for book in books {
        for copy in &book.copies {
            let open = open_per_copy.get(&copy.copy_id).copied().unwrap_or(0);
            if copy.status == CopyStatus::OnLoan && open == 0 {
                findings.push(Inconsistency::MissingOpenLoan {
                    book: book.isbn.clone(),
                    copy: copy.copy_id,
                });
            }
            if open > 1 {
                findings.push(Inconsistency::MultipleOpenLoans {
                    copy: copy.copy_id,
                    count: open,
                });
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::{Author, BookCopy};
    use crate::modules::loans::models::LoanStatus;
    use crate::utils::date;

    fn book(status: CopyStatus) -> Book {
        Book {
            id: ObjectId::new(),
            isbn: "978-0747532743".to_string(),
            title: "Harry Potter and the Philosopher's Stone".to_string(),
            publication_year: 1997,
            publisher: "Bloomsbury".to_string(),
            genre: vec!["Fantasy".to_string()],
            authors: vec![Author::new("J.K. Rowling", "British")],
            copies: vec![BookCopy::new(date(2019, 11, 5).unwrap(), status, "Shelf C1")],
        }
    }

    fn open_loan(book: &Book) -> Loan {
        Loan {
            id: ObjectId::new(),
            book_id: book.id,
            copy_id: book.copies[0].copy_id,
            member_id: ObjectId::new(),
            loan_date: date(2023, 1, 5).unwrap(),
            due_date: date(2023, 1, 19).unwrap(),
            return_date: None,
            status: LoanStatus::OnLoan,
        }
    }

    #[test]
    fn matching_open_loan_is_consistent() {
        let book = book(CopyStatus::OnLoan);
        let loan = open_loan(&book);
        assert!(check(&[book], &[loan]).is_empty());
    }

    #[test]
    fn open_loan_on_available_copy_is_reported() {
        let book = book(CopyStatus::Available);
        let loan = open_loan(&book);
        let findings = check(&[book], std::slice::from_ref(&loan));
        assert_eq!(
            findings,
            vec![Inconsistency::CopyNotOnLoan {
                loan: loan.id,
                copy: loan.copy_id,
            }]
        );
    }

    #[test]
    fn on_loan_copy_without_loan_is_reported() {
        let book = book(CopyStatus::OnLoan);
        let findings = check(std::slice::from_ref(&book), &[]);
        assert!(matches!(
            findings.as_slice(),
            [Inconsistency::MissingOpenLoan { copy, .. }] if *copy == book.copies[0].copy_id
        ));
    }

    #[test]
    fn returned_loan_does_not_pin_copy() {
        let book = book(CopyStatus::Available);
        let mut loan = open_loan(&book);
        loan.status = LoanStatus::Returned;
        loan.return_date = Some(date(2023, 1, 10).unwrap());
        assert!(check(&[book], &[loan]).is_empty());
    }

    #[test]
    fn second_open_loan_and_foreign_copy_are_reported() {
        let book = book(CopyStatus::OnLoan);
        let first = open_loan(&book);
        let second = open_loan(&book);
        let mut stray = open_loan(&book);
        stray.copy_id = ObjectId::new();

        let findings = check(&[book], &[first, second, stray.clone()]);
        assert_eq!(findings.len(), 2);
        assert!(findings.contains(&Inconsistency::UnknownCopy {
            loan: stray.id,
            book: stray.book_id,
            copy: stray.copy_id,
        }));
        assert!(findings
            .iter()
            .any(|finding| matches!(finding, Inconsistency::MultipleOpenLoans { count: 2, .. })));
        assert!(findings.iter().all(|finding| !finding.to_string().is_empty()));
    }
}
