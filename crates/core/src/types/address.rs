//! Shipping addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::AddressId;

/// A saved shipping address, as owned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub zip_code: String,
}

impl Address {
    /// The editable fields of this address, without its id.
    #[must_use]
    pub fn to_form(&self) -> AddressForm {
        AddressForm {
            name: self.name.clone(),
            contact_number: self.contact_number.clone(),
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            landmark: self.landmark.clone(),
            zip_code: self.zip_code.clone(),
        }
    }
}

impl fmt::Display for Address {
    /// One-line summary: `street, city, state zip`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}",
            self.street, self.city, self.state, self.zip_code
        )
    }
}

/// The required address fields, for pointing at the one that is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Street,
    City,
    State,
    ZipCode,
}

impl AddressField {
    /// All fields that must be filled before an address can be saved.
    pub const REQUIRED: [Self; 4] = [Self::Street, Self::City, Self::State, Self::ZipCode];
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Street => "street",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
        })
    }
}

/// Working copy of an address being typed in; also the body sent to create one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub zip_code: String,
}

impl AddressForm {
    /// Build a form from the four required fields.
    #[must_use]
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            ..Self::default()
        }
    }

    /// Current value of a required field.
    #[must_use]
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::Street => &self.street,
            AddressField::City => &self.city,
            AddressField::State => &self.state,
            AddressField::ZipCode => &self.zip_code,
        }
    }

    /// Replace a required field's value.
    pub fn set(&mut self, field: AddressField, value: String) {
        let slot = match field {
            AddressField::Street => &mut self.street,
            AddressField::City => &mut self.city,
            AddressField::State => &mut self.state,
            AddressField::ZipCode => &mut self.zip_code,
        };
        *slot = value;
    }

    /// Required fields that are blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<AddressField> {
        AddressField::REQUIRED
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_uses_api_field_names() {
        let json = r#"{"id":"a1","street":"Main","city":"X","state":"Y","zipCode":"1"}"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert_eq!(address.id.as_str(), "a1");
        assert_eq!(address.zip_code, "1");
        assert_eq!(address.to_string(), "Main, X, Y 1");
    }

    #[test]
    fn test_missing_fields() {
        let form = AddressForm::new("Main", "", "Y", " ");
        assert_eq!(
            form.missing_fields(),
            vec![AddressField::City, AddressField::ZipCode]
        );
        assert!(AddressForm::new("a", "b", "c", "d").missing_fields().is_empty());
        assert_eq!(AddressForm::default().missing_fields(), AddressField::REQUIRED);
    }

    #[test]
    fn test_form_body_omits_unset_optionals() {
        let body = serde_json::to_value(AddressForm::new("Main", "X", "Y", "1")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"street":"Main","city":"X","state":"Y","zipCode":"1"})
        );
    }
}
