//! Completion gateway: prompt text in, generated text out
//!
//! The gateway is the only component that touches the network. Every failure
//! it can produce is a `GatewayError` value so callers decide how to absorb it.

pub mod groq;

use serde::Serialize;
use thiserror::Error;

pub use groq::GroqGateway;

/// A single completion call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Failures at the gateway boundary
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication failed ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Anything that can turn a prompt into generated text
pub trait CompletionGateway {
    fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}

impl<G: CompletionGateway + ?Sized> CompletionGateway for &G {
    fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        (**self).complete(request)
    }
}

impl<G: CompletionGateway + ?Sized> CompletionGateway for Box<G> {
    fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        (**self).complete(request)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GatewayError::Auth {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert_eq!(err.to_string(), "authentication failed (401): invalid api key");

        let err = GatewayError::Transport("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_boxed_gateway_delegates() {
        let stub = testing::StubGateway::new(|_| Ok("OK".to_string()));
        let boxed: Box<dyn CompletionGateway> = Box::new(stub);
        let request = CompletionRequest {
            model: "m".to_string(),
            prompt: "p".to_string(),
            temperature: 0.7,
        };
        assert_eq!(boxed.complete(&request).unwrap(), "OK");
    }
}
