use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{ticket::Ticket, WithId};

/// Opaque identity of whoever places an order. Supplied by the identity
/// provider, never validated here beyond being non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Requester(String);

impl Requester {
    pub fn new<S: Into<String>>(identity: S) -> Option<Self> {
        let identity = identity.into();
        if identity.trim().is_empty() {
            None
        } else {
            Some(Self(identity))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Order {
    pub user: Requester,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user: Requester) -> Self {
        Self {
            user,
            created_at: Utc::now(),
        }
    }
}

impl HasId for Order {
    type IdType = i64;
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct OrderDetail {
    pub id: Id<Order>,
    pub user: Requester,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<WithId<Ticket>>,
}

impl OrderDetail {
    pub fn new(order: WithId<Order>, tickets: Vec<WithId<Ticket>>) -> Self {
        Self {
            id: order.id,
            user: order.content.user,
            created_at: order.content.created_at,
            tickets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identities_are_rejected() {
        assert_eq!(Requester::new(""), None);
        assert_eq!(Requester::new("   "), None);
        assert_eq!(
            Requester::new("testuser").map(|r| r.to_string()),
            Some("testuser".to_owned())
        );
    }
}
