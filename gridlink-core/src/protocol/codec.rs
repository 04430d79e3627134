//! Framing codec splitting a byte stream into whole protocol messages.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use super::constants::{FRAME_LENGTH_OFFSET, HEADER_SIZE};
use super::message::Message;
use crate::error::{GridlinkError, Result};

/// Codec for whole [`Message`] frames over a byte stream.
///
/// Implements `tokio_util::codec::{Encoder, Decoder}` for use with framed
/// I/O owned by the external connection layer. The codec itself performs no
/// I/O and keeps no per-message state; partial frames stay in the source
/// buffer until the declared frame length is available.
/// Upper bound on a single frame; anything larger is treated as corrupt
/// rather than buffered.
const MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

#[derive(Debug, Default)]
pub struct MessageCodec;

impl MessageCodec {
    /// Creates a new codec instance.
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = GridlinkError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<()> {
        let bytes = item.to_bytes();
        if item.frame_length() as usize != bytes.len() {
            return Err(GridlinkError::Protocol(format!(
                "cannot encode message: declared frame length {} does not match buffer length {}",
                item.frame_length(),
                bytes.len()
            )));
        }
        dst.reserve(bytes.len());
        dst.extend_from_slice(bytes);
        Ok(())
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = GridlinkError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < FRAME_LENGTH_OFFSET + 4 {
            return Ok(None);
        }

        // validated as a signed value; a cast first would let negative
        // lengths sign-extend past the minimum check
        let frame_length = i32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        if frame_length < HEADER_SIZE as i32 {
            return Err(GridlinkError::Protocol(format!(
                "invalid frame length: {}",
                frame_length
            )));
        }
        let frame_length = frame_length as usize;
        if frame_length > MAX_FRAME_LENGTH {
            return Err(GridlinkError::Protocol(format!(
                "frame length {} exceeds maximum {}",
                frame_length, MAX_FRAME_LENGTH
            )));
        }

        if src.len() < frame_length {
            src.reserve(frame_length - src.len());
            return Ok(None);
        }

        let frame = src.copy_to_bytes(frame_length);
        trace!(frame_length, "decoded frame");
        Message::from_bytes(frame.to_vec()).map(Some)
    }
}
