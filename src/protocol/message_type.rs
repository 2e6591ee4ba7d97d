//! Message type catalog.
//!
//! Every frame starts with a numeric type id. This module holds the closed
//! mapping between ids and [`MessageType`], and the static classification
//! of each type as an outbound request, an outbound command, an inbound
//! unary response, or an inbound streamed push.
//!
//! # Classification
//!
//! | Kind | Direction | Delivery |
//! |------|-----------|----------|
//! | `Request` | Local → Backend | Expects exactly one `Unary` reply |
//! | `Command` | Local → Backend | Fire-and-forget |
//! | `Unary` | Backend → Local | Resolves the oldest matching pending request |
//! | `Streamed` | Backend → Local | Published to every subscriber of its channel |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// MessageKind
// ============================================================================

/// Static classification of a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Outbound request answered by a single unary response.
    Request,
    /// Outbound command with no acknowledgement.
    Command,
    /// Inbound response to a request.
    Unary,
    /// Inbound push message.
    Streamed,
}

impl MessageKind {
    /// Returns `true` for kinds the backend sends to the client.
    #[inline]
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(self, Self::Unary | Self::Streamed)
    }
}

// ============================================================================
// MessageType
// ============================================================================

/// Generates [`MessageType`] together with its id and kind tables.
macro_rules! message_types {
    ($($(#[$meta:meta])* $name:ident = $id:literal => $kind:ident,)+) => {
        /// Every message type in the ICD.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum MessageType {
            $($(#[$meta])* $name = $id,)+
        }

        impl MessageType {
            /// All message types, in id order.
            pub const ALL: &'static [MessageType] = &[$(MessageType::$name,)+];

            /// Looks up a message type by its wire id.
            #[must_use]
            pub const fn from_id(id: u16) -> Option<Self> {
                match id {
                    $($id => Some(Self::$name),)+
                    _ => None,
                }
            }

            /// Returns the static classification of this type.
            #[must_use]
            pub const fn kind(self) -> MessageKind {
                match self {
                    $(Self::$name => MessageKind::$kind,)+
                }
            }
        }
    };
}

message_types! {
    /// Session registration.
    RegisterViewer = 1 => Request,
    /// Directory listing.
    FileListRequest = 2 => Request,
    /// Header/metadata of one image file.
    FileInfoRequest = 3 => Request,
    /// Open an image file under a caller-chosen file id.
    OpenFile = 4 => Request,
    /// Select channel and Stokes of an open image.
    SetImageChannels = 6 => Command,
    /// Move the cursor over an image.
    SetCursor = 7 => Command,
    /// Configure spatial profiles for a region.
    SetSpatialRequirements = 8 => Command,
    /// Configure histograms for a region.
    SetHistogramRequirements = 9 => Command,
    /// Configure statistics for a region.
    SetStatsRequirements = 10 => Command,
    /// Create or update a region.
    SetRegion = 11 => Request,
    /// Remove a region.
    RemoveRegion = 12 => Command,
    /// Close an image file.
    CloseFile = 13 => Command,
    /// Configure spectral profiles for a region.
    SetSpectralRequirements = 14 => Command,
    /// Start channel animation.
    StartAnimation = 15 => Command,
    /// Reports the id of a started animation.
    StartAnimationAck = 16 => Streamed,
    /// Stop channel animation.
    StopAnimation = 17 => Command,
    /// Acknowledges [`MessageType::RegisterViewer`].
    RegisterViewerAck = 18 => Unary,
    /// Answers [`MessageType::FileListRequest`].
    FileListResponse = 19 => Unary,
    /// Answers [`MessageType::FileInfoRequest`].
    FileInfoResponse = 20 => Unary,
    /// Acknowledges [`MessageType::OpenFile`].
    OpenFileAck = 21 => Unary,
    /// Acknowledges [`MessageType::SetRegion`].
    SetRegionAck = 22 => Unary,
    /// Histogram push.
    RegionHistogramData = 23 => Streamed,
    /// Spatial profile push.
    SpatialProfileData = 25 => Streamed,
    /// Spectral profile push, partial until `progress` reaches 1.
    SpectralProfileData = 26 => Streamed,
    /// Region statistics push.
    RegionStatsData = 27 => Streamed,
    /// Backend error or warning push.
    ErrorData = 28 => Streamed,
    /// Animation frame acknowledgement.
    AnimationFlowControl = 29 => Command,
    /// Request raster tiles.
    AddRequiredTiles = 30 => Command,
    /// Cancel raster tiles.
    RemoveRequiredTiles = 31 => Command,
    /// One raster tile.
    RasterTileData = 32 => Streamed,
    /// List region files in a directory.
    RegionListRequest = 33 => Request,
    /// Answers [`MessageType::RegionListRequest`].
    RegionListResponse = 34 => Unary,
    /// Contents of one region file.
    RegionFileInfoRequest = 35 => Request,
    /// Answers [`MessageType::RegionFileInfoRequest`].
    RegionFileInfoResponse = 36 => Unary,
    /// Import regions from a file or inline contents.
    ImportRegion = 37 => Request,
    /// Acknowledges [`MessageType::ImportRegion`].
    ImportRegionAck = 38 => Unary,
    /// Export regions to a file or inline contents.
    ExportRegion = 39 => Request,
    /// Acknowledges [`MessageType::ExportRegion`].
    ExportRegionAck = 40 => Unary,
    /// Configure contour generation.
    SetContourParameters = 45 => Command,
    /// Contour push, partial until `progress` reaches 1.
    ContourImageData = 46 => Streamed,
    /// Restore images and regions after a reconnect.
    ResumeSession = 47 => Request,
    /// Acknowledges [`MessageType::ResumeSession`].
    ResumeSessionAck = 48 => Unary,
    /// Start/end marker bracketing a batch of raster tiles.
    RasterTileSync = 49 => Streamed,
    /// List catalog files in a directory.
    CatalogListRequest = 50 => Request,
    /// Answers [`MessageType::CatalogListRequest`].
    CatalogListResponse = 51 => Unary,
    /// Header of one catalog file.
    CatalogFileInfoRequest = 52 => Request,
    /// Answers [`MessageType::CatalogFileInfoRequest`].
    CatalogFileInfoResponse = 53 => Unary,
    /// Open a catalog file.
    OpenCatalogFile = 54 => Request,
    /// Acknowledges [`MessageType::OpenCatalogFile`].
    OpenCatalogFileAck = 55 => Unary,
    /// Close a catalog file.
    CloseCatalogFile = 56 => Command,
    /// Request filtered catalog rows.
    CatalogFilterRequest = 57 => Command,
    /// Catalog rows push, partial until `progress` reaches 1.
    CatalogFilterResponse = 58 => Streamed,
    /// Generate moment images.
    MomentRequest = 61 => Request,
    /// Answers [`MessageType::MomentRequest`].
    MomentResponse = 62 => Unary,
    /// Moment generation progress push.
    MomentProgress = 63 => Streamed,
    /// Cancel moment generation.
    StopMomentCalc = 64 => Command,
    /// Save an image, optionally cropped to a region.
    SaveFile = 65 => Request,
    /// Acknowledges [`MessageType::SaveFile`].
    SaveFileAck = 66 => Unary,
    /// Directory listing progress push.
    FileListProgress = 71 => Streamed,
    /// Cancel a directory listing.
    StopFileList = 72 => Command,
    /// Generate a position-velocity image.
    PvRequest = 73 => Request,
    /// Answers [`MessageType::PvRequest`].
    PvResponse = 74 => Unary,
    /// PV generation progress push.
    PvProgress = 75 => Streamed,
    /// Cancel PV generation.
    StopPvCalc = 76 => Command,
    /// Fit Gaussian components to an image.
    FittingRequest = 77 => Request,
    /// Answers [`MessageType::FittingRequest`].
    FittingResponse = 78 => Unary,
    /// Configure vector overlay generation.
    SetVectorOverlayParameters = 79 => Command,
    /// Vector overlay tile push, partial until `progress` reaches 1.
    VectorOverlayTileData = 80 => Streamed,
    /// Fitting progress push.
    FittingProgress = 81 => Streamed,
    /// Cancel fitting.
    StopFitting = 82 => Command,
    /// PV preview image push.
    PvPreviewData = 83 => Streamed,
    /// Stop a PV preview.
    StopPvPreview = 84 => Command,
    /// Close a PV preview.
    ClosePvPreview = 85 => Command,
}

impl MessageType {
    /// Returns the wire id of this type.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Returns `true` if this type is matched against pending requests.
    #[inline]
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self.kind(), MessageKind::Unary)
    }

    /// Returns `true` if this type is published to stream channels.
    #[inline]
    #[must_use]
    pub const fn is_streamed(self) -> bool {
        matches!(self.kind(), MessageKind::Streamed)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// Tests
// ============================================================================
