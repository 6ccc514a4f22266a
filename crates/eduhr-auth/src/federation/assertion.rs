//! Typed federation assertions.
//!
//! The identity-provider client releases a loosely-typed attribute map
//! (name → ordered values). [`Assertion::from_attributes`] validates it once
//! at the boundary; everything downstream works with explicit optional
//! fields.

use std::collections::BTreeMap;

use crate::error::ErrorCode;

/// Attribute name → ordered list of values, as released by the SP.
pub type AttributeMap = BTreeMap<String, Vec<String>>;

/// Attribute names used by the AAI@EduHr federation.
pub mod attributes {
    /// Stable federation identifier (`user@realm`), the login source.
    pub const UNIQUE_ID: &str = "hrEduPersonUniqueID";
    /// Email address.
    pub const MAIL: &str = "mail";
    /// Given name.
    pub const GIVEN_NAME: &str = "givenName";
    /// Surname.
    pub const SURNAME: &str = "sn";
    /// National identification code (OIB).
    pub const NATIONAL_ID: &str = "hrEduPersonOIB";
    /// Persistent (targeted) identifier.
    pub const PERSISTENT_ID: &str = "hrEduPersonPersistentID";

    /// Every attribute the flow reads.
    pub const KNOWN: [&str; 6] = [
        UNIQUE_ID,
        MAIL,
        GIVEN_NAME,
        SURNAME,
        NATIONAL_ID,
        PERSISTENT_ID,
    ];
}

/// A verified assertion about the authenticated person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub unique_id: String,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub national_id: Option<String>,
    pub persistent_id: Option<String>,
}

impl Assertion {
    /// Creates an assertion with only the unique identifier set.
    #[must_use]
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            email: None,
            given_name: None,
            surname: None,
            national_id: None,
            persistent_id: None,
        }
    }

    /// Builds an assertion from a released attribute map.
    ///
    /// Only the first value of each attribute is used. Missing attributes,
    /// empty value lists and blank first values all count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::NoUniqueId`] when the unique identifier is absent.
    pub fn from_attributes(map: &AttributeMap) -> Result<Self, ErrorCode> {
        let first = |name: &str| {
            map.get(name)
                .and_then(|values| values.first())
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let unique_id = first(attributes::UNIQUE_ID).ok_or(ErrorCode::NoUniqueId)?;

        Ok(Self {
            unique_id,
            email: first(attributes::MAIL),
            given_name: first(attributes::GIVEN_NAME),
            surname: first(attributes::SURNAME),
            national_id: first(attributes::NATIONAL_ID),
            persistent_id: first(attributes::PERSISTENT_ID),
        })
    }

    /// The realm: everything after the last `@` of the unique identifier,
    /// or the whole identifier when it has no `@`.
    #[must_use]
    pub fn realm(&self) -> &str {
        self.unique_id
            .rsplit_once('@')
            .map_or(self.unique_id.as_str(), |(_, realm)| realm)
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets given name and surname.
    #[must_use]
    pub fn with_name(mut self, given_name: impl Into<String>, surname: impl Into<String>) -> Self {
        self.given_name = Some(given_name.into());
        self.surname = Some(surname.into());
        self
    }

    /// Sets the national identification code.
    #[must_use]
    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    /// Sets the persistent identifier.
    #[must_use]
    pub fn with_persistent_id(mut self, persistent_id: impl Into<String>) -> Self {
        self.persistent_id = Some(persistent_id.into());
        self
    }
}
