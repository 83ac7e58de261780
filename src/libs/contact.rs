use crate::libs::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An emergency contact. Stored field names match the mobile app's format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    /// Local number without the country code.
    pub phone_number: String,
    /// Dialling code without the leading `+`, e.g. `86`.
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
}

impl Contact {
    /// Builds an active contact with a fresh random id.
    pub fn new(params: NewContact) -> Self {
        Contact {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            phone_number: params.phone_number,
            country_code: params.country_code,
            relationship: params.relationship,
            is_active: true,
            last_updated: Utc::now(),
        }
    }

    /// Full international number, e.g. `+86 12345678`.
    pub fn international_number(&self) -> String {
        format!("+{} {}", self.country_code, self.phone_number)
    }

    pub(crate) fn apply(&mut self, update: ContactUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(country_code) = update.country_code {
            self.country_code = country_code;
        }
        if let Some(relationship) = update.relationship {
            self.relationship = if relationship.is_empty() { None } else { Some(relationship) };
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.last_updated = Utc::now();
    }
}

/// Fields required to create a contact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContact {
    pub name: String,
    pub phone_number: String,
    pub country_code: String,
    pub relationship: Option<String>,
}

impl NewContact {
    pub fn new(name: &str, phone_number: &str, country_code: &str) -> Self {
        NewContact {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            country_code: country_code.to_string(),
            relationship: None,
        }
    }

    pub fn with_relationship(mut self, relationship: &str) -> Self {
        self.relationship = Some(relationship.to_string());
        self
    }

    /// Trims every field and checks the name and numbers.
    pub fn validated(self) -> AppResult<Self> {
        Ok(NewContact {
            name: validate_name(&self.name)?,
            phone_number: validate_phone_number(&self.phone_number)?,
            country_code: validate_country_code(&self.country_code)?,
            relationship: self.relationship.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
        })
    }
}

/// Partial update; `None` leaves a field untouched.
///
/// An empty `relationship` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub country_code: Option<String>,
    pub relationship: Option<String>,
    pub is_active: Option<bool>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ContactUpdate::default()
    }

    pub fn validated(self) -> AppResult<Self> {
        Ok(ContactUpdate {
            name: self.name.as_deref().map(validate_name).transpose()?,
            phone_number: self.phone_number.as_deref().map(validate_phone_number).transpose()?,
            country_code: self.country_code.as_deref().map(validate_country_code).transpose()?,
            relationship: self.relationship.map(|r| r.trim().to_string()),
            is_active: self.is_active,
        })
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidContact("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn validate_phone_number(phone_number: &str) -> AppResult<String> {
    let phone_number = phone_number.trim();
    if phone_number.is_empty() || !phone_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidContact(format!("phone number '{}' must contain digits only", phone_number)));
    }
    Ok(phone_number.to_string())
}

fn validate_country_code(country_code: &str) -> AppResult<String> {
    let trimmed = country_code.trim();
    let code = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if code.is_empty() || code.len() > 4 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidContact(format!("country code '{}' is not a dialling code", country_code)));
    }
    Ok(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_contact_is_active_with_unique_id() {
        let a = Contact::new(NewContact::new("Mom", "12345678", "86"));
        let b = Contact::new(NewContact::new("Mom", "12345678", "86"));
        assert!(a.is_active);
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_validation_trims_and_strips_plus() {
        let params = NewContact::new("  Dad ", " 5550100 ", "+1").with_relationship("  ").validated().unwrap();
        assert_eq!(params.name, "Dad");
        assert_eq!(params.phone_number, "5550100");
        assert_eq!(params.country_code, "1");
        assert_eq!(params.relationship, None);
    }

    #[test]
    fn test_validation_rejects_bad_numbers() {
        assert!(NewContact::new("", "123", "86").validated().is_err());
        assert!(NewContact::new("Mom", "12-34", "86").validated().is_err());
        assert!(NewContact::new("Mom", "1234", "abc").validated().is_err());
    }

    #[test]
    fn test_serialized_field_names() {
        let contact = Contact::new(NewContact::new("Mom", "12345678", "86"));
        let json = serde_json::to_value(&contact).unwrap();
        assert!(json.get("phoneNumber").is_some());
        assert!(json.get("countryCode").is_some());
        assert!(json.get("isActive").is_some());
        assert!(json.get("lastUpdated").is_some());
        assert!(json.get("relationship").is_none());
    }

    #[test]
    fn test_apply_update_clears_relationship() {
        let mut contact = Contact::new(NewContact::new("Mom", "12345678", "86").with_relationship("mother"));
        contact.apply(ContactUpdate {
            relationship: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(contact.relationship, None);
    }
}
