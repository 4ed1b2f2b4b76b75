//! Reply generation collaborator.
//!
//! The wording of replies is not this crate's concern: a `ReplyGenerator`
//! receives the inbound text and returns a body, optionally naming a loose
//! file that should be attached to the reply.

use roomlog_types::attachment::LooseAttachment;

/// What a generator produced for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub body: String,
    pub attachment: Option<LooseAttachment>,
}

impl GeneratedReply {
    /// A text-only reply.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            attachment: None,
        }
    }
}

/// Produces reply text for an inbound message.
pub trait ReplyGenerator: Send + Sync {
    fn generate(&self, text: &str) -> impl std::future::Future<Output = GeneratedReply> + Send;
}

/// Deterministic stand-in generator: `"Reply: <text>"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoReplyGenerator;

impl ReplyGenerator for EchoReplyGenerator {
    async fn generate(&self, text: &str) -> GeneratedReply {
        GeneratedReply::text(format!("Reply: {text}"))
    }
}
