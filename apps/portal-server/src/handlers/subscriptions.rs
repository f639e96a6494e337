//! Category subscription page and toggle form.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use portal_core::error::ValidationErrors;
use portal_core::services::SubscriptionAction;
use portal_shared::ApiResponse;
use portal_shared::dto::{SubscriptionEntry, SubscriptionForm, SubscriptionsPage};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn page(state: &AppState, user_id: Uuid) -> AppResult<SubscriptionsPage> {
    let categories = state
        .subscriptions
        .overview(user_id)
        .await?
        .into_iter()
        .map(|status| SubscriptionEntry {
            id: status.category.id,
            name: status.category.name,
            user_subscribed: status.subscribed,
        })
        .collect();

    Ok(SubscriptionsPage {
        categories,
        csrf_token: state.csrf.token_for(user_id).await,
    })
}

/// GET /subscriptions/
pub async fn subscriptions(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let body = page(&state, identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /subscriptions/ - subscribe or unsubscribe, then show the page again.
pub async fn toggle_subscription(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<SubscriptionForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    if !state.csrf.validate(identity.user_id, &form.csrf_token).await {
        tracing::warn!(user = %identity.username, "Subscription form with bad CSRF token");
        return Err(AppError::Forbidden("CSRF token missing or incorrect".to_string()));
    }

    let mut errors = ValidationErrors::new();
    let category_id = Uuid::parse_str(form.category_id.trim())
        .map_err(|_| errors.add_field("category_id", "Enter a valid category id."))
        .ok();
    let action = form
        .action
        .parse::<SubscriptionAction>()
        .map_err(|e| errors.add_field("action", e))
        .ok();
    let (Some(category_id), Some(action)) = errors.into_result((category_id, action))? else {
        return Err(AppError::BadRequest("Invalid subscription form".to_string()));
    };

    state
        .subscriptions
        .toggle(identity.user_id, category_id, action)
        .await?;

    let body = page(&state, identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}
