use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use validator::Validate;

use super::{clean, not_blank};
use crate::auth::MaybeUser;
use crate::db::feedback::{FeedbackRepository, NewFeedback};
use crate::error::Result;
use crate::models::Feedback;
use crate::state::AppState;

pub fn routes() -> Router<AppState> { Router::new().route("/feedback", post(create_feedback)) }

#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    pub customer_name: Option<String>,
    #[validate(email(message = "must be a valid email"))]
    pub customer_email: Option<String>,
    #[validate(custom = "not_blank")]
    pub subject: String,
    #[validate(custom = "not_blank")]
    pub message: String,
}

/// Contact form; anonymous visitors welcome.
async fn create_feedback(
    State(s): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(mut r): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>)> {
    r.customer_email = clean(r.customer_email);
    r.validate()?;
    let feedback = FeedbackRepository::new(&s.db)
        .create(&NewFeedback {
            user_id: user.map(|u| u.user_id),
            customer_name: clean(r.customer_name),
            customer_email: r.customer_email,
            subject: r.subject.trim().to_string(),
            message: r.message.trim().to_string(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}
