//! Category subscription management.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::Category;
use crate::error::DomainError;
use crate::ports::{CategoryRepository, SubscriberRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionAction {
    Subscribe,
    Unsubscribe,
}

impl FromStr for SubscriptionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscribe" => Ok(Self::Subscribe),
            "unsubscribe" => Ok(Self::Unsubscribe),
            other => Err(format!("unknown subscription action: {other}")),
        }
    }
}

/// A category and whether the user is subscribed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionStatus {
    pub category: Category,
    pub subscribed: bool,
}

#[derive(Clone)]
pub struct SubscriptionService {
    categories: Arc<dyn CategoryRepository>,
    subscribers: Arc<dyn SubscriberRepository>,
}

impl SubscriptionService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        subscribers: Arc<dyn SubscriberRepository>,
    ) -> Self {
        Self {
            categories,
            subscribers,
        }
    }

    /// Subscribe adds a row even when one exists; unsubscribe removes all
    /// rows for the pair.
    pub async fn toggle(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        action: SubscriptionAction,
    ) -> Result<(), DomainError> {
        self.categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", category_id))?;

        match action {
            SubscriptionAction::Subscribe => {
                self.subscribers.subscribe(user_id, category_id).await?;
                tracing::info!(%user_id, %category_id, "Subscribed to category");
            }
            SubscriptionAction::Unsubscribe => {
                let removed = self.subscribers.unsubscribe(user_id, category_id).await?;
                tracing::info!(%user_id, %category_id, removed, "Unsubscribed from category");
            }
        }
        Ok(())
    }

    /// Every category ordered by name, flagged with the user's subscription.
    pub async fn overview(&self, user_id: Uuid) -> Result<Vec<SubscriptionStatus>, DomainError> {
        let subscribed: HashSet<Uuid> = self
            .subscribers
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|s| s.category_id)
            .collect();

        let statuses = self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|category| SubscriptionStatus {
                subscribed: subscribed.contains(&category.id),
                category,
            })
            .collect();

        Ok(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        assert_eq!(
            "subscribe".parse::<SubscriptionAction>(),
            Ok(SubscriptionAction::Subscribe)
        );
        assert_eq!(
            "unsubscribe".parse::<SubscriptionAction>(),
            Ok(SubscriptionAction::Unsubscribe)
        );
        assert!("toggle".parse::<SubscriptionAction>().is_err());
    }
}
