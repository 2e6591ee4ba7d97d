//! Decoded messages and the traits tying structs to message types.
//!
//! Inbound bodies are decoded once, at the codec boundary, into the closed
//! [`Payload`] union. The router and the stream combinators only ever see
//! [`Message`]s carrying a `Payload`, so every consumer works on a checked
//! schema instead of loosely typed JSON.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::MessageType;
use super::response::*;
use super::stream::*;

// ============================================================================
// Traits
// ============================================================================

/// A message the client sends.
pub trait OutboundMessage: Serialize + Send + Sync + 'static {
    /// Wire type of this message.
    const MESSAGE_TYPE: MessageType;
}

/// A request answered by exactly one unary response.
pub trait UnaryRequest: OutboundMessage {
    /// Response type resolving this request.
    type Response: InboundMessage;
}

/// A message the backend sends.
///
/// Implemented for every variant of [`Payload`].
pub trait InboundMessage: Clone + Send + Sync + 'static {
    /// Wire type of this message.
    const MESSAGE_TYPE: MessageType;

    /// Borrows the message out of a payload of the matching variant.
    fn from_payload(payload: &Payload) -> Option<&Self>;

    /// Moves the message out of a payload, handing the payload back on mismatch.
    fn try_from_payload(payload: Payload) -> std::result::Result<Self, Payload>;

    /// Wraps the message into its payload variant.
    fn into_payload(self) -> Payload;
}

// ============================================================================
// Payload
// ============================================================================

/// Generates [`Payload`] and the [`InboundMessage`] impls of its variants.
macro_rules! inbound_payloads {
    ($($name:ident),+ $(,)?) => {
        /// Decoded body of an inbound message.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Payload {
            $(
                #[allow(missing_docs)]
                $name($name),
            )+
        }

        impl Payload {
            /// Returns the wire type of this payload.
            #[must_use]
            pub fn message_type(&self) -> MessageType {
                match self {
                    $(Self::$name(_) => MessageType::$name,)+
                }
            }

            /// Decodes a frame body of the given type.
            ///
            /// An empty body is a message with every field at its default.
            ///
            /// # Errors
            ///
            /// [`Error::Decode`] if the type is outbound-only or the body
            /// does not match its schema.
            pub fn decode(message_type: MessageType, body: &[u8]) -> Result<Self> {
                match message_type {
                    $(
                        MessageType::$name if body.is_empty() => {
                            Ok(Self::$name($name::default()))
                        }
                        MessageType::$name => serde_json::from_slice(body)
                            .map(Self::$name)
                            .map_err(|e| Error::decode(format!("{message_type} body: {e}"))),
                    )+
                    other => Err(Error::decode(format!(
                        "{other} is not an inbound message type"
                    ))),
                }
            }

            /// Serializes the body of this payload.
            ///
            /// # Errors
            ///
            /// [`Error::Json`] if serialization fails.
            pub fn encode_body(&self) -> Result<Vec<u8>> {
                match self {
                    $(Self::$name(message) => Ok(serde_json::to_vec(message)?),)+
                }
            }
        }

        $(
            impl InboundMessage for $name {
                const MESSAGE_TYPE: MessageType = MessageType::$name;

                fn from_payload(payload: &Payload) -> Option<&Self> {
                    match payload {
                        Payload::$name(message) => Some(message),
                        _ => None,
                    }
                }

                fn try_from_payload(payload: Payload) -> std::result::Result<Self, Payload> {
                    match payload {
                        Payload::$name(message) => Ok(message),
                        other => Err(other),
                    }
                }

                fn into_payload(self) -> Payload {
                    Payload::$name(self)
                }
            }

            impl From<$name> for Payload {
                fn from(message: $name) -> Self {
                    Payload::$name(message)
                }
            }
        )+
    };
}

inbound_payloads! {
    // Unary
    RegisterViewerAck,
    ResumeSessionAck,
    FileListResponse,
    FileInfoResponse,
    OpenFileAck,
    SaveFileAck,
    SetRegionAck,
    RegionListResponse,
    RegionFileInfoResponse,
    ImportRegionAck,
    ExportRegionAck,
    CatalogListResponse,
    CatalogFileInfoResponse,
    OpenCatalogFileAck,
    MomentResponse,
    PvResponse,
    FittingResponse,
    // Streamed
    StartAnimationAck,
    RegionHistogramData,
    RegionStatsData,
    SpatialProfileData,
    SpectralProfileData,
    RasterTileData,
    RasterTileSync,
    ContourImageData,
    VectorOverlayTileData,
    CatalogFilterResponse,
    MomentProgress,
    PvProgress,
    FittingProgress,
    FileListProgress,
    PvPreviewData,
    ErrorData,
}

impl Payload {
    /// Returns the `fileId` field, for messages that carry one.
    #[must_use]
    pub fn file_id(&self) -> Option<i32> {
        match self {
            Self::OpenFileAck(m) => Some(m.file_id),
            Self::SaveFileAck(m) => Some(m.file_id),
            Self::OpenCatalogFileAck(m) => Some(m.file_id),
            Self::RegionHistogramData(m) => Some(m.file_id),
            Self::RegionStatsData(m) => Some(m.file_id),
            Self::SpatialProfileData(m) => Some(m.file_id),
            Self::SpectralProfileData(m) => Some(m.file_id),
            Self::RasterTileData(m) => Some(m.file_id),
            Self::RasterTileSync(m) => Some(m.file_id),
            Self::ContourImageData(m) => Some(m.file_id),
            Self::VectorOverlayTileData(m) => Some(m.file_id),
            Self::CatalogFilterResponse(m) => Some(m.file_id),
            Self::MomentProgress(m) => Some(m.file_id),
            Self::PvProgress(m) => Some(m.file_id),
            Self::FittingProgress(m) => Some(m.file_id),
            _ => None,
        }
    }

    /// Returns the `regionId` field, for messages that carry one.
    #[must_use]
    pub fn region_id(&self) -> Option<i32> {
        match self {
            Self::SetRegionAck(m) => Some(m.region_id),
            Self::RegionHistogramData(m) => Some(m.region_id),
            Self::RegionStatsData(m) => Some(m.region_id),
            Self::SpatialProfileData(m) => Some(m.region_id),
            Self::SpectralProfileData(m) => Some(m.region_id),
            Self::CatalogFilterResponse(m) => Some(m.region_id),
            _ => None,
        }
    }

    /// Returns the completion fraction, for messages that report one.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        match self {
            Self::RegionHistogramData(m) => Some(f64::from(m.progress)),
            Self::SpectralProfileData(m) => Some(f64::from(m.progress)),
            Self::ContourImageData(m) => Some(m.progress),
            Self::VectorOverlayTileData(m) => Some(m.progress),
            Self::CatalogFilterResponse(m) => Some(f64::from(m.progress)),
            Self::MomentProgress(m) => Some(f64::from(m.progress)),
            Self::PvProgress(m) => Some(f64::from(m.progress)),
            Self::FittingProgress(m) => Some(f64::from(m.progress)),
            Self::FileListProgress(m) => Some(f64::from(m.percentage)),
            _ => None,
        }
    }

    /// Returns `true` if this message reports `progress == 1`.
    ///
    /// Progress is monotone in `[0, 1]`, so anything at or above 1 counts.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress().is_some_and(|progress| progress >= 1.0)
    }

    /// Returns the backend's message if this response rejects its request.
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::FileInfoResponse(m) if !m.success => Some(m.message.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// Message
// ============================================================================

/// One decoded inbound message.
///
/// Cloning is cheap: the payload is shared between every subscriber the
/// message is published to.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Request id from the frame header.
    pub request_id: RequestId,
    /// ICD version from the frame header.
    pub icd_version: u16,
    /// Decoded body.
    pub payload: Arc<Payload>,
}

impl Message {
    /// Creates a message with the current ICD version.
    #[must_use]
    pub fn new(request_id: RequestId, payload: impl Into<Payload>) -> Self {
        Self {
            request_id,
            icd_version: super::frame::ICD_VERSION,
            payload: Arc::new(payload.into()),
        }
    }

    /// Returns the wire type of this message.
    #[inline]
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    /// Borrows the body as `T`, if this message is a `T`.
    #[inline]
    #[must_use]
    pub fn get<T: InboundMessage>(&self) -> Option<&T> {
        T::from_payload(&self.payload)
    }

    /// Takes the body as `T`, cloning only if the payload is still shared.
    #[must_use]
    pub fn into_inner<T: InboundMessage>(self) -> Option<T> {
        match Arc::try_unwrap(self.payload) {
            Ok(payload) => T::try_from_payload(payload).ok(),
            Err(shared) => T::from_payload(&shared).cloned(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
