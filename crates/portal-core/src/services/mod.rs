//! Domain services - the portal's business rules.

pub mod censor;
pub mod filter;
pub mod form;
pub mod notifier;
pub mod publishing;
pub mod rating;
pub mod subscriptions;

pub use censor::Censor;
pub use filter::PostFilter;
pub use form::{PostForm, ValidatedPost};
pub use notifier::{NotificationContent, NotificationReport, NotifierConfig, SubscriptionNotifier};
pub use publishing::PublishingService;
pub use rating::{RatingService, compute_reputation};
pub use subscriptions::{SubscriptionAction, SubscriptionService, SubscriptionStatus};
