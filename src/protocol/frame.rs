//! Frame codec.
//!
//! Each binary WebSocket message is one frame:
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬─────────────────────┐
//! │ type id  u16 │ ICD ver  u16 │ req id   u32 │ body (JSON, camel)  │
//! └──────────────┴──────────────┴──────────────┴─────────────────────┘
//!   little-endian, 8-byte header
//! ```
//!
//! The transport delivers frames pre-segmented, so no length prefix is
//! needed.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::message::{Message, OutboundMessage, Payload};
use super::MessageType;

// ============================================================================
// Constants
// ============================================================================

/// Size of the frame header in bytes.
pub const HEADER_LEN: usize = 8;

/// ICD version written into outbound headers.
pub const ICD_VERSION: u16 = 30;

// ============================================================================
// FrameHeader
// ============================================================================

/// Fixed-size frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Type of the body.
    pub message_type: MessageType,
    /// ICD version of the sender.
    pub icd_version: u16,
    /// Request id.
    pub request_id: RequestId,
}

impl FrameHeader {
    /// Creates a header with the current ICD version.
    #[inline]
    #[must_use]
    pub const fn new(message_type: MessageType, request_id: RequestId) -> Self {
        Self {
            message_type,
            icd_version: ICD_VERSION,
            request_id,
        }
    }

    /// Splits a frame into its header and body.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the frame is shorter than [`HEADER_LEN`] or the
    /// type id is unknown.
    pub fn parse(frame: &[u8]) -> Result<(Self, &[u8])> {
        let Some((header, body)) = frame.split_first_chunk::<HEADER_LEN>() else {
            return Err(Error::decode(format!(
                "frame of {} bytes is shorter than the {HEADER_LEN}-byte header",
                frame.len()
            )));
        };

        let type_id = u16::from_le_bytes([header[0], header[1]]);
        let icd_version = u16::from_le_bytes([header[2], header[3]]);
        let request_id = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let message_type = MessageType::from_id(type_id)
            .ok_or_else(|| Error::decode(format!("unknown message type id {type_id}")))?;

        Ok((
            Self {
                message_type,
                icd_version,
                request_id: RequestId::new(request_id),
            },
            body,
        ))
    }

    /// Appends the encoded header to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.message_type.id().to_le_bytes());
        buf.extend_from_slice(&self.icd_version.to_le_bytes());
        buf.extend_from_slice(&self.request_id.as_u32().to_le_bytes());
    }
}

// ============================================================================
// Encode / Decode
// ============================================================================

/// Encodes an outbound message into a frame.
///
/// # Errors
///
/// [`Error::Json`] if the body fails to serialize.
pub fn encode<M: OutboundMessage>(message: &M, request_id: RequestId) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(message)?;
    Ok(assemble(FrameHeader::new(M::MESSAGE_TYPE, request_id), &body))
}

/// Encodes an inbound payload into a frame.
///
/// This is the backend's side of the codec; the client uses it for
/// loopback testing and replay.
///
/// # Errors
///
/// [`Error::Json`] if the body fails to serialize.
pub fn encode_payload(payload: &Payload, request_id: RequestId) -> Result<Vec<u8>> {
    let body = payload.encode_body()?;
    Ok(assemble(FrameHeader::new(payload.message_type(), request_id), &body))
}

/// Decodes an inbound frame.
///
/// # Errors
///
/// [`Error::Decode`] for short frames, unknown or outbound-only type ids,
/// and bodies that do not match their schema.
pub fn decode(frame: &[u8]) -> Result<Message> {
    let (header, body) = FrameHeader::parse(frame)?;
    let payload = Payload::decode(header.message_type, body)?;

    Ok(Message {
        request_id: header.request_id,
        icd_version: header.icd_version,
        payload: payload.into(),
    })
}

fn assemble(header: FrameHeader, body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    header.write_to(&mut frame);
    frame.extend_from_slice(body);
    frame
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CloseFile, OpenFileAck, RasterTileSync};

    #[test]
    fn test_header_layout() {
        let frame = encode(&CloseFile { file_id: 3 }, RequestId::new(0x0102_0304)).expect("encode");

        assert_eq!(&frame[0..2], &MessageType::CloseFile.id().to_le_bytes());
        assert_eq!(&frame[2..4], &ICD_VERSION.to_le_bytes());
        assert_eq!(&frame[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&frame[HEADER_LEN..], br#"{"fileId":3}"#);
    }

    #[test]
    fn test_decode_inbound_frame() {
        let payload = Payload::from(OpenFileAck {
            success: true,
            file_id: 1,
            ..Default::default()
        });
        let frame = encode_payload(&payload, RequestId::new(9)).expect("encode");

        let message = decode(&frame).expect("decode");
        assert_eq!(message.request_id, RequestId::new(9));
        assert_eq!(message.icd_version, ICD_VERSION);
        assert_eq!(*message.payload, payload);
    }

    #[test]
    fn test_decode_short_frame() {
        let result = decode(&[1, 0, 30]);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_decode_unknown_type() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&999u16.to_le_bytes());
        frame.extend_from_slice(&ICD_VERSION.to_le_bytes());
        frame.extend_from_slice(&0u32.to_le_bytes());
        frame.extend_from_slice(b"{}");

        let err = decode(&frame).expect_err("unknown type");
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_decode_outbound_type_rejected() {
        let frame = encode(&CloseFile { file_id: 0 }, RequestId::new(1)).expect("encode");
        assert!(matches!(decode(&frame), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_header_only_frame_uses_defaults() {
        let mut frame = Vec::new();
        FrameHeader::new(MessageType::RasterTileSync, RequestId::new(4)).write_to(&mut frame);
        assert_eq!(frame.len(), HEADER_LEN);

        let message = decode(&frame).expect("decode");
        assert_eq!(message.request_id, RequestId::new(4));
        assert_eq!(message.get::<RasterTileSync>(), Some(&RasterTileSync::default()));
    }

    #[test]
    fn test_empty_object_body_uses_defaults() {
        let mut frame = Vec::new();
        FrameHeader::new(MessageType::RasterTileSync, RequestId::new(0)).write_to(&mut frame);
        frame.extend_from_slice(b"{}");

        let message = decode(&frame).expect("decode");
        assert_eq!(message.get::<RasterTileSync>(), Some(&RasterTileSync::default()));
    }

    #[test]
    fn test_header_only_outbound_type_rejected() {
        let mut frame = Vec::new();
        FrameHeader::new(MessageType::CloseFile, RequestId::new(0)).write_to(&mut frame);

        assert!(matches!(decode(&frame), Err(Error::Decode { .. })));
    }
}
