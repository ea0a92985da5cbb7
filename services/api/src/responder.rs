//! Chat reply strategies

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error};

use crate::settings::{ChatFallback, Settings};

/// Default text-generation endpoint
pub const DEFAULT_AI_ENDPOINT: &str = "http://localhost:8000/query";

/// Reply when nothing more specific is available
pub const GENERAL_GUIDANCE: &str = "Thank you for sharing your health concern. I'm analyzing this and will provide general guidance. Remember, I can offer health information but for specific medical advice, diagnosis, or treatment, please consult with a qualified healthcare professional. Could you tell me more about your symptoms or concerns?";

/// Keyword replies, checked in this order; the first contained keyword wins
pub const DEFAULT_KEYWORDS: &[(&str, &str)] = &[
    (
        "hello",
        "Hello! I'm Health Harbor AI, your personal health advisor. How can I assist you with your health concerns today?",
    ),
    (
        "headache",
        "I understand you're experiencing a headache. This could be due to various factors like stress, dehydration, or tension. Make sure to drink plenty of water, rest in a quiet room, and consider over-the-counter pain relief if appropriate. If the headache is severe, persistent, or accompanied by other symptoms like vision changes or fever, please consult a healthcare professional immediately.",
    ),
    (
        "sleep",
        "Sleep is crucial for overall health. Adults typically need 7-9 hours of quality sleep per night. Maintain a consistent sleep schedule, create a relaxing bedtime routine, and avoid screens before bed. If you're having persistent sleep issues, it's best to consult with a healthcare provider.",
    ),
    (
        "fever",
        "A fever is often a sign that your body is fighting an infection. Make sure to stay hydrated, rest, and monitor your temperature. If the fever is high (above 103°F/39.4°C), lasts more than 3 days, or is accompanied by severe symptoms like difficulty breathing or a stiff neck, seek medical attention immediately.",
    ),
    (
        "cough",
        "A cough can be caused by various factors including colds, allergies, or respiratory infections. Stay hydrated, use a humidifier, and consider over-the-counter remedies for symptom relief. If your cough persists for more than 3 weeks, is accompanied by chest pain, or you're coughing up blood, please see a doctor.",
    ),
    (
        "stress",
        "Stress can have significant impacts on both mental and physical health. Practice relaxation techniques like deep breathing, meditation, or gentle exercise. Ensure you're getting enough sleep and maintaining a balanced diet. If stress is affecting your daily life, consider speaking with a mental health professional.",
    ),
    (
        "diet",
        "A balanced diet is essential for good health. Focus on whole foods like fruits, vegetables, lean proteins, and whole grains. Stay hydrated and limit processed foods and added sugars. For personalized nutrition advice, consider consulting with a registered dietitian.",
    ),
    (
        "exercise",
        "Regular physical activity is important for maintaining health. Aim for at least 150 minutes of moderate exercise per week. Start slowly if you're new to exercise and choose activities you enjoy. Always consult with a healthcare provider before starting a new exercise program, especially if you have existing health conditions.",
    ),
    (
        "calories",
        "Several exercises can help with this. Combine regular cardio with strength training and track your intake to keep a steady calorie balance.",
    ),
    (
        "stationary",
        "For a mostly stationary routine it is recommended to follow a strict diet with a calorie deficit, and to add short walks or stretching breaks during the day.",
    ),
];

/// Produces the assistant's reply to a user message
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, message: &str) -> String;
}

/// Fixed general-guidance reply
#[derive(Debug, Clone, Default)]
pub struct CannedResponder;

#[async_trait]
impl Responder for CannedResponder {
    async fn respond(&self, _message: &str) -> String {
        GENERAL_GUIDANCE.to_string()
    }
}

/// Ordered keyword table with a fallback for unmatched messages
pub struct KeywordResponder {
    entries: Vec<(String, String)>,
    fallback: Arc<dyn Responder>,
}

impl KeywordResponder {
    pub fn new<K, R>(entries: impl IntoIterator<Item = (K, R)>, fallback: Arc<dyn Responder>) -> Self
    where
        K: Into<String>,
        R: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(keyword, reply)| (keyword.into().to_lowercase(), reply.into()))
            .collect();
        Self { entries, fallback }
    }

    /// Responder over [`DEFAULT_KEYWORDS`]
    pub fn with_defaults(fallback: Arc<dyn Responder>) -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied(), fallback)
    }

    /// Reply of the first keyword contained in the message, ignoring case
    pub fn lookup(&self, message: &str) -> Option<&str> {
        let message = message.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| message.contains(keyword.as_str()))
            .map(|(_, reply)| reply.as_str())
    }
}

#[async_trait]
impl Responder for KeywordResponder {
    async fn respond(&self, message: &str) -> String {
        match self.lookup(message) {
            Some(reply) => reply.to_string(),
            None => self.fallback.respond(message).await,
        }
    }
}

/// Keyword table over the configured reply source for unmatched messages
pub fn chat_responder(settings: &Settings) -> Arc<dyn Responder> {
    let fallback: Arc<dyn Responder> = match settings.chat_fallback {
        ChatFallback::Generator => Arc::new(HttpResponder::new(settings.ai_endpoint.clone())),
        ChatFallback::Canned => Arc::new(CannedResponder),
    };
    Arc::new(KeywordResponder::with_defaults(fallback))
}

/// Forwards the message to a text-generation endpoint
///
/// The body of the endpoint's response is the reply. Failures become an
/// inline error reply rather than a failed request.
pub struct HttpResponder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpResponder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn query(&self, message: &str) -> Result<String, reqwest::Error> {
        self.client
            .post(&self.endpoint)
            .json(&json!({ "query": message }))
            .send()
            .await?
            .text()
            .await
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn respond(&self, message: &str) -> String {
        debug!("Forwarding chat message to {}", self.endpoint);
        match self.query(message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Text-generation request to {} failed: {}", self.endpoint, e);
                format!("Error sending request: {}", e)
            }
        }
    }
}
