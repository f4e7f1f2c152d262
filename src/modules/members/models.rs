use anyhow::ensure;
use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
}

/// A registered library member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Human-readable membership number, e.g. `M1001`.
    pub member_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub membership_start: DateTime,
    pub active: bool,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.member_id.trim().is_empty(),
            "member {} has an empty memberId",
            self.id
        );
        ensure!(
            !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty(),
            "member {} is missing a name",
            self.member_id
        );
        ensure!(
            self.email.contains('@'),
            "member {} has an invalid email '{}'",
            self.member_id,
            self.email
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Member {
        Member {
            id: ObjectId::new(),
            member_id: "M1001".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Johnson".to_string(),
            email: "alice.johnson@example.com".to_string(),
            phone: "+1555123456".to_string(),
            address: Address {
                street: "123 Oak Street".to_string(),
                city: "Springfield".to_string(),
                zip: "12345".to_string(),
            },
            membership_start: DateTime::now(),
            active: true,
        }
    }

    #[test]
    fn serializes_member_id_and_address() {
        let document = bson::to_document(&sample()).unwrap();
        assert_eq!(document.get_str("memberId").unwrap(), "M1001");
        assert_eq!(document.get_str("firstName").unwrap(), "Alice");
        assert!(document.get_bool("active").unwrap());
        let address = document.get_document("address").unwrap();
        assert_eq!(address.get_str("zip").unwrap(), "12345");
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        let mut member = sample();
        member.email = "alice.example.com".to_string();
        let error = member.validate().unwrap_err();
        assert!(error.to_string().contains("invalid email"));
        assert_eq!(sample().full_name(), "Alice Johnson");
    }
}
