use serde::{Deserialize, Serialize};

use storefront_core::{typed_id, DomainError, DomainResult, Entity};

typed_id!(
    /// Customer identifier.
    CustomerId,
    "CustomerId"
);

/// Customer record.
///
/// Order placement only cares that a customer exists; the remaining fields are
/// carried through unchanged into the stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomer")]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct RawCustomer {
    id: CustomerId,
    name: String,
    #[serde(default)]
    email: Option<String>,
}

impl TryFrom<RawCustomer> for Customer {
    type Error = DomainError;

    fn try_from(raw: RawCustomer) -> Result<Self, Self::Error> {
        let customer = Self::new(raw.id, raw.name)?;
        match raw.email {
            Some(email) => customer.with_email(email),
            None => Ok(customer),
        }
    }
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            email: None,
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> DomainResult<Self> {
        let email = email.into();
        if !email.contains('@') {
            return Err(DomainError::validation("customer email must contain '@'"));
        }
        self.email = Some(email);
        Ok(self)
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
