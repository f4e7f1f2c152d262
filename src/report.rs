use std::fmt;

use bson::{Bson, Document};

use crate::modules::loans::consistency::Inconsistency;

/// Read-only observations taken after the fixtures are in place.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub stats: Document,
    pub books: u64,
    pub members: u64,
    pub loans: u64,
    pub findings: Vec<Inconsistency>,
}

impl VerificationReport {
    /// Statistics as relaxed extended JSON.
    pub fn stats_json(&self) -> serde_json::Value {
        Bson::Document(self.stats.clone()).into_relaxed_extjson()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = serde_json::to_string_pretty(&self.stats_json()).map_err(|_| fmt::Error)?;

        writeln!(f, "Database stats:")?;
        writeln!(f, "{stats}")?;
        writeln!(f)?;
        writeln!(f, "Book count:")?;
        writeln!(f, "{}", self.books)?;
        writeln!(f)?;
        writeln!(f, "Member count:")?;
        writeln!(f, "{}", self.members)?;
        writeln!(f)?;
        writeln!(f, "Loan count:")?;
        write!(f, "{}", self.loans)?;

        if !self.findings.is_empty() {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "Consistency findings:")?;
            for finding in &self.findings {
                write!(f, "\n- {finding}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};

    fn report() -> VerificationReport {
        VerificationReport {
            stats: doc! { "db": "library", "collections": 3_i64, "ok": 1.0 },
            books: 3,
            members: 2,
            loans: 2,
            findings: Vec::new(),
        }
    }

    #[test]
    fn renders_sections_in_order() {
        let rendered = report().to_string();
        let stats = rendered.find("Database stats:").unwrap();
        let books = rendered.find("Book count:\n3").unwrap();
        let members = rendered.find("Member count:\n2").unwrap();
        let loans = rendered.find("Loan count:\n2").unwrap();
        assert!(stats < books && books < members && members < loans);
        assert!(rendered.contains("\"db\": \"library\""));
        assert!(!rendered.contains("Consistency findings"));
    }

    #[test]
    fn findings_are_listed() {
        let mut report = report();
        report.findings.push(Inconsistency::MultipleOpenLoans {
            copy: ObjectId::new(),
            count: 2,
        });
        let rendered = report.to_string();
        assert!(rendered.contains("Consistency findings:\n- copy "));
        assert!(rendered.ends_with("has 2 open loans"));
    }
}
