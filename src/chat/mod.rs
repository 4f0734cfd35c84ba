//! Shop assistant chat, proxied to an OpenAI-compatible gateway.
//!
//! The service adds the shop's system prompt and streams the gateway's
//! server-sent events back untouched.

pub mod client;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::ChatClient;

pub const SYSTEM_PROMPT: &str = "Tu es l'assistant virtuel de FGS Store (FourniGSM Store), une boutique spécialisée dans la réparation de smartphones et la vente d'accessoires GSM à Zaghouan, Tunisie.

Informations sur FGS Store:
- Adresse: Av de la République, ZAGHOUAN
- Téléphone: 54 080 419
- Horaires: Lundi - Samedi, 9h - 19h

Services proposés:
- Réparation de smartphones (écrans cassés, batteries, problèmes de charge, etc.)
- Vente d'accessoires (coques, chargeurs, écouteurs, etc.)
- Photocopies et services administratifs
- Visite technique

Points forts:
- Réparation express en moins de 24h pour la plupart des pannes
- Garantie 6 mois sur toutes les réparations
- Pièces de qualité OEM
- Prix compétitifs

Tu dois être:
- Poli et professionnel
- Utile et informatif
- Répondre en français par défaut, mais tu peux aussi répondre en arabe tunisien si le client le souhaite
- Guider les clients vers les bonnes pages (boutique, réparation, contact)
- Aider avec les questions sur les produits, les réparations et les commandes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Body sent to the gateway.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// The conversation as sent upstream: system prompt first.
pub fn with_system_prompt(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut all = Vec::with_capacity(messages.len() + 1);
    all.push(ChatMessage { role: "system".into(), content: SYSTEM_PROMPT.into() });
    all.extend(messages);
    all
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("AI gateway API key is not configured")]
    MissingApiKey,
    #[error("gateway rate limit reached")]
    RateLimited,
    #[error("gateway requires payment")]
    PaymentRequired,
    #[error("gateway returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ChatError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MissingApiKey => (StatusCode::INTERNAL_SERVER_ERROR, "AI gateway API key is not configured"),
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Limite de requêtes atteinte, réessayez plus tard."),
            Self::PaymentRequired => (StatusCode::PAYMENT_REQUIRED, "Service temporairement indisponible."),
            Self::Upstream { .. } | Self::Transport(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Erreur du service AI"),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        match &self {
            Self::RateLimited | Self::PaymentRequired => tracing::warn!(error = %self, "Chat rejected by gateway"),
            _ => tracing::error!(error = %self, "Chat error"),
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_goes_first() {
        let messages = with_system_prompt(vec![ChatMessage { role: "user".into(), content: "Salam".into() }]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("FGS Store"));
        assert_eq!(messages[1].content, "Salam");
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(ChatError::RateLimited.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ChatError::PaymentRequired.into_response().status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(ChatError::MissingApiKey.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        let upstream = ChatError::Upstream { status: StatusCode::BAD_GATEWAY, body: "oops".into() };
        assert_eq!(upstream.status_and_message().1, "Erreur du service AI");
    }
}
