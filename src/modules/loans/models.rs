use anyhow::ensure;
use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a loan. `Overdue` is never produced by the setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    #[serde(rename = "on loan")]
    OnLoan,
    #[serde(rename = "returned")]
    Returned,
    #[serde(rename = "overdue")]
    Overdue,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::OnLoan => "on loan",
            LoanStatus::Returned => "returned",
            LoanStatus::Overdue => "overdue",
        }
    }
}

/// A member borrowing one specific copy of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub book_id: ObjectId,
    /// Must name a copy embedded in `book_id`.
    pub copy_id: ObjectId,
    /// The member's `_id`, not the human-readable membership number.
    pub member_id: ObjectId,
    pub loan_date: DateTime,
    pub due_date: DateTime,
    /// Serialized as an explicit null while the loan is open.
    pub return_date: Option<DateTime>,
    pub status: LoanStatus,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.due_date >= self.loan_date,
            "loan {} is due before it starts",
            self.id
        );
        ensure!(
            (self.status == LoanStatus::Returned) == self.return_date.is_some(),
            "loan {} has status '{}' but return date {:?}",
            self.id,
            self.status.as_str(),
            self.return_date
        );
        if let Some(returned) = self.return_date {
            ensure!(
                returned > self.loan_date,
                "loan {} is returned before it was lent",
                self.id
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date;

    fn open_loan() -> Loan {
        Loan {
            id: ObjectId::new(),
            book_id: ObjectId::new(),
            copy_id: ObjectId::new(),
            member_id: ObjectId::new(),
            loan_date: date(2023, 1, 5).unwrap(),
            due_date: date(2023, 1, 19).unwrap(),
            return_date: None,
            status: LoanStatus::OnLoan,
        }
    }

    #[test]
    fn open_loan_serializes_null_return_date() {
        let document = bson::to_document(&open_loan()).unwrap();
        assert_eq!(document.get("returnDate"), Some(&bson::Bson::Null));
        assert_eq!(document.get_str("status").unwrap(), "on loan");
        assert!(document.get_object_id("memberId").is_ok());
    }

    #[test]
    fn returned_status_requires_return_date() {
        let mut loan = open_loan();
        loan.status = LoanStatus::Returned;
        assert!(loan.validate().is_err());

        loan.return_date = Some(date(2023, 1, 10).unwrap());
        assert!(loan.validate().is_ok());
        assert!(!loan.is_open());
    }

    #[test]
    fn return_before_loan_date_is_rejected() {
        let mut loan = open_loan();
        loan.status = LoanStatus::Returned;
        loan.return_date = Some(date(2023, 1, 5).unwrap());
        let error = loan.validate().unwrap_err();
        assert!(error.to_string().contains("returned before"));
    }

    #[test]
    fn due_before_loan_is_rejected() {
        let mut loan = open_loan();
        loan.due_date = date(2022, 12, 31).unwrap();
        assert!(loan.validate().is_err());
    }
}
