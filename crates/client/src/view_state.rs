//! Render state of the assistant reply currently on screen.

use crate::stream::StreamHandler;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChatViewState {
    #[default]
    Idle,
    Streaming {
        content: String,
    },
    Settled {
        content: String,
    },
    Failed {
        message: String,
    },
}

impl ChatViewState {
    pub fn reset(&mut self) {
        *self = ChatViewState::Idle;
    }

    /// Reply text to render, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            ChatViewState::Streaming { content } | ChatViewState::Settled { content } => {
                Some(content)
            }
            ChatViewState::Idle | ChatViewState::Failed { .. } => None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, ChatViewState::Streaming { .. })
    }
}

impl StreamHandler for ChatViewState {
    fn on_chunk(&mut self, content: &str) {
        // Frames carry the whole reply so far; replace, never append.
        *self = ChatViewState::Streaming {
            content: content.to_string(),
        };
    }

    fn on_complete(&mut self, content: &str) {
        *self = ChatViewState::Settled {
            content: content.to_string(),
        };
    }

    fn on_error(&mut self, message: &str) {
        *self = ChatViewState::Failed {
            message: message.to_string(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::consume_stream;
    use futures::stream;
    use promptdeck_core::chat::{StreamChunk, StreamFrame};

    #[test]
    fn test_chunks_replace_content() {
        let mut view = ChatViewState::default();
        view.on_chunk("H");
        view.on_chunk("He");
        assert_eq!(view.content(), Some("He"));
        assert!(view.is_streaming());

        view.on_complete("Hello");
        assert_eq!(
            view,
            ChatViewState::Settled {
                content: "Hello".to_string()
            }
        );
        assert!(!view.is_streaming());
    }

    #[test]
    fn test_error_and_reset() {
        let mut view = ChatViewState::default();
        view.on_chunk("partial");
        view.on_error("Streaming failed: boom");
        assert_eq!(view.content(), None);

        view.reset();
        assert_eq!(view, ChatViewState::Idle);
    }

    #[tokio::test]
    async fn test_view_settles_from_stream() {
        let body: String = [
            StreamFrame::from(StreamChunk::partial("Hi")),
            StreamFrame::from(StreamChunk::finished("Hi there")),
        ]
        .iter()
        .map(|f| f.encode().unwrap())
        .collect();

        let mut view = ChatViewState::default();
        let pieces: Vec<Result<Vec<u8>, String>> = vec![Ok(body.into_bytes())];
        consume_stream(stream::iter(pieces), &mut view).await;

        assert_eq!(
            view,
            ChatViewState::Settled {
                content: "Hi there".to_string()
            }
        );
    }
}
