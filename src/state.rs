use std::sync::Arc;

use sqlx::PgPool;

use crate::chat::ChatClient;
use crate::config::AppConfig;
use crate::publisher::EventPublisher;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub events: EventPublisher,
    pub chat: ChatClient,
}
