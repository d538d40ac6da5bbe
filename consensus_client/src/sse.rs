//! Framing of `text/event-stream` bodies into events.
//!
//! See <https://html.spec.whatwg.org/multipage/server-sent-events.html#event-stream-interpretation>.
//! The `id` and `retry` fields are ignored because subscriptions are never resumed.

use std::collections::VecDeque;

use futures::stream::{self, BoxStream, Stream, StreamExt as _};

use crate::error::{Error, Result};

const DEFAULT_EVENT_TYPE: &str = "message";

// Head events are a few hundred bytes long.
pub const MAX_EVENT_LINE_LENGTH: usize = 1 << 20;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ServerSentEvent {
    pub event: String,
    pub data: String,
}

#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Option<String>,
}

impl SseDecoder {
    /// Feeds a chunk of the body and returns the events it completes.
    ///
    /// Chunks may split lines and even UTF-8 sequences at arbitrary points.
    /// Fails if an unterminated line grows past [`MAX_EVENT_LINE_LENGTH`].
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<ServerSentEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = vec![];
        let mut consumed = 0;

        while let Some(offset) = self.buffer[consumed..]
            .iter()
            .position(|byte| *byte == b'\n')
        {
            let line_end = consumed + offset;
            let line = self.buffer[consumed..line_end]
                .strip_suffix(b"\r")
                .unwrap_or(&self.buffer[consumed..line_end]);
            let line = String::from_utf8_lossy(line).into_owned();

            consumed = line_end + 1;

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        self.buffer.drain(..consumed);

        if self.buffer.len() > MAX_EVENT_LINE_LENGTH {
            return Err(Error::EventLineTooLong {
                limit: MAX_EVENT_LINE_LENGTH,
            });
        }

        Ok(events)
    }

    fn process_line(&mut self, line: &str) -> Option<ServerSentEvent> {
        if line.is_empty() {
            return self.dispatch();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_owned()),
            },
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<ServerSentEvent> {
        let event = self.event.take();
        let data = self.data.take()?;

        Some(ServerSentEvent {
            event: event
                .filter(|event| !event.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_owned()),
            data,
        })
    }
}

/// Frames a stream of body chunks into events.
///
/// The first transport error is yielded and ends the stream.
pub fn server_sent_events<B, E>(
    body: impl Stream<Item = Result<B, E>> + Send + 'static,
) -> BoxStream<'static, Result<ServerSentEvent>>
where
    B: AsRef<[u8]> + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    let state = (body.boxed(), SseDecoder::default(), VecDeque::new(), false);

    stream::unfold(state, |(mut body, mut decoder, mut pending, done)| async move {
        loop {
            if let Some(event) = pending.pop_front() {
                return Some((Ok(event), (body, decoder, pending, done)));
            }

            if done {
                return None;
            }

            match body.next().await {
                Some(Ok(chunk)) => match decoder.push(chunk.as_ref()) {
                    Ok(events) => pending.extend(events),
                    Err(error) => return Some((Err(error), (body, decoder, pending, true))),
                },
                Some(Err(error)) => {
                    return Some((Err(error.into()), (body, decoder, pending, true)));
                }
                None => return None,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use futures::{StreamExt as _, TryStreamExt as _};
    use test_case::test_case;

    use super::*;

    fn event(event: &str, data: &str) -> ServerSentEvent {
        ServerSentEvent {
            event: event.to_owned(),
            data: data.to_owned(),
        }
    }

    #[test_case(
        b"event: head\ndata: {\"slot\":\"1\"}\n\n"
        => vec![event("head", "{\"slot\":\"1\"}")];
        "single event"
    )]
    #[test_case(
        b"event:head\r\ndata:a\r\n\r\n"
        => vec![event("head", "a")];
        "CRLF line endings without spaces"
    )]
    #[test_case(
        b"data: first\ndata: second\n\n"
        => vec![event("message", "first\nsecond")];
        "multi-line data with default event type"
    )]
    #[test_case(
        b": keep-alive\n\nevent: head\nid: 7\nretry: 10\ndata: x\n\n"
        => vec![event("head", "x")];
        "comments and unused fields"
    )]
    #[test_case(
        b"event: head\n\nevent: block\ndata: y\n\n"
        => vec![event("block", "y")];
        "event without data is discarded"
    )]
    #[test_case(
        b"event: head\ndata: incomplete\n"
        => Vec::<ServerSentEvent>::new();
        "event without terminating blank line"
    )]
    fn sse_decoder_frames_events(body: &[u8]) -> Vec<ServerSentEvent> {
        SseDecoder::default()
            .push(body)
            .expect("body has no overlong lines")
    }

    #[test]
    fn sse_decoder_handles_arbitrary_chunk_boundaries() -> Result<()> {
        let body = "event: head\ndata: σ\n\nevent: head\ndata: τ\n\n".as_bytes();

        for split in 0..body.len() {
            let mut decoder = SseDecoder::default();
            let (first, second) = body.split_at(split);

            let mut events = decoder.push(first)?;
            events.extend(decoder.push(second)?);

            assert_eq!(events, [event("head", "σ"), event("head", "τ")]);
        }

        Ok(())
    }

    #[test]
    fn sse_decoder_rejects_overlong_unterminated_line() -> Result<()> {
        let mut decoder = SseDecoder::default();

        decoder.push(b"data: ")?;
        decoder.push(&vec![b'a'; MAX_EVENT_LINE_LENGTH - 6])?;

        assert!(matches!(
            decoder.push(b"a"),
            Err(Error::EventLineTooLong {
                limit: MAX_EVENT_LINE_LENGTH,
            }),
        ));

        Ok(())
    }

    #[tokio::test]
    async fn server_sent_events_stops_after_overlong_line() -> Result<()> {
        let chunks = vec![
            Ok::<_, Error>(b"event: head\ndata: 1\n\n".to_vec()),
            Ok(vec![b'a'; MAX_EVENT_LINE_LENGTH + 1]),
            Ok(b"\n\nevent: head\ndata: 2\n\n".to_vec()),
        ];

        let mut events = server_sent_events(stream::iter(chunks));

        assert_eq!(events.try_next().await?, Some(event("head", "1")));
        assert!(matches!(
            events.next().await,
            Some(Err(Error::EventLineTooLong { .. })),
        ));
        assert!(events.next().await.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn server_sent_events_stops_after_transport_error() -> Result<()> {
        let chunks = vec![
            Ok(b"event: head\nda".to_vec()),
            Ok(b"ta: 1\n\n".to_vec()),
            Err(Error::Cancelled),
            Ok(b"event: head\ndata: 2\n\n".to_vec()),
        ];

        let mut events = server_sent_events(stream::iter(chunks));

        assert_eq!(events.try_next().await?, Some(event("head", "1")));
        assert!(matches!(events.next().await, Some(Err(Error::Cancelled))));
        assert!(events.next().await.is_none());

        Ok(())
    }
}
