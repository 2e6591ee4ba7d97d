//! Outbound messages: unary requests and fire-and-forget commands.
//!
//! Each struct is the body of one outbound frame and implements
//! [`OutboundMessage`], which ties it to its [`MessageType`]. Whether a
//! reply is expected is a property of the type (see
//! [`MessageKind`](super::MessageKind)), not of the struct.
//!
//! # Requests
//!
//! | Message | Reply |
//! |---------|-------|
//! | [`RegisterViewer`] | `RegisterViewerAck` |
//! | [`FileListRequest`] | `FileListResponse` |
//! | [`FileInfoRequest`] | `FileInfoResponse` |
//! | [`OpenFile`] | `OpenFileAck` |
//! | [`SetRegion`] | `SetRegionAck` |
//! | [`ImportRegion`] / [`ExportRegion`] | `ImportRegionAck` / `ExportRegionAck` |
//! | [`ResumeSession`] | `ResumeSessionAck` |
//! | [`SaveFile`] | `SaveFileAck` |
//! | [`MomentRequest`] / [`PvRequest`] / [`FittingRequest`] | matching response |
//! | [`CatalogFileInfoRequest`] | `CatalogFileInfoResponse` |

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::identifiers::SessionId;

use super::message::{OutboundMessage, UnaryRequest};
use super::response::*;
use super::types::{
    CompressionType, CoordinateType, FileType, FloatBounds, ImageBounds, IntBounds, Point,
    RegionInfo, RegionStyle,
};
use super::MessageType;

// ============================================================================
// Session
// ============================================================================

/// Registers this client with the backend.
///
/// `session_id` of zero asks for a new session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterViewer {
    /// Session to resume, or [`SessionId::NEW`].
    pub session_id: SessionId,
    /// Optional API key.
    pub api_key: String,
    /// Feature flags advertised by the client.
    pub client_feature_flags: u32,
}

/// Restores a previous session's images and regions.
///
/// The backend pushes catch-up stream messages (e.g. histograms for each
/// reopened image) around the acknowledgement, so subscribe first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeSession {
    /// Images to reopen.
    pub images: Vec<ImageProperties>,
    /// Catalog files to reopen.
    pub catalog_files: Vec<OpenCatalogFile>,
}

/// State of one image to restore on resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProperties {
    /// Directory of the image.
    pub directory: String,
    /// File name.
    pub file: String,
    /// HDU (FITS only).
    pub hdu: String,
    /// File id to reopen under.
    pub file_id: i32,
    /// Channel to restore.
    pub channel: i32,
    /// Stokes index to restore.
    pub stokes: i32,
    /// Regions keyed by region id.
    pub regions: FxHashMap<i32, RegionInfo>,
    /// Contour configuration to restore.
    pub contour_settings: Option<SetContourParameters>,
}

// ============================================================================
// Files
// ============================================================================

/// How directory listings decide what counts as a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileListFilterMode {
    /// Inspect file contents.
    #[default]
    Content,
    /// Trust file extensions.
    Extension,
    /// List every file.
    AllFiles,
}

/// Which listing a [`StopFileList`] cancels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileListType {
    /// Image listing.
    #[default]
    Image,
    /// Catalog listing.
    Catalog,
}

/// Lists image files in a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileListRequest {
    /// Directory, relative to the backend's root.
    pub directory: String,
    /// Filtering mode.
    pub filter_mode: FileListFilterMode,
}

/// Cancels a running directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopFileList {
    /// Listing to cancel.
    pub file_list_type: FileListType,
}

/// Requests header information of one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInfoRequest {
    /// Directory of the image.
    pub directory: String,
    /// File name.
    pub file: String,
    /// HDU (FITS only).
    pub hdu: String,
}

/// Opens an image under a caller-chosen file id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenFile {
    /// Directory of the image.
    pub directory: String,
    /// File name, or a LEL expression when `lel_expr` is set.
    pub file: String,
    /// HDU (FITS only).
    pub hdu: String,
    /// Id the image is referred to by afterwards.
    pub file_id: i32,
    /// Treat `file` as an image expression.
    pub lel_expr: bool,
    /// Read AIPS beam tables.
    pub support_aips_beam: bool,
}

/// Closes an image. A `file_id` of -1 closes every image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloseFile {
    /// Image to close.
    pub file_id: i32,
}

/// Saves an image, optionally cropped to a region and channel/Stokes subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveFile {
    /// Image to save.
    pub file_id: i32,
    /// Output directory.
    pub output_file_directory: String,
    /// Output file name.
    pub output_file_name: String,
    /// Output format.
    pub output_file_type: FileType,
    /// Region to crop to, 0 for the whole image.
    pub region_id: i32,
    /// Channel range `[start, end, stride]`.
    pub channels: Vec<i32>,
    /// Stokes range `[start, end, stride]`.
    pub stokes: Vec<i32>,
    /// Keep degenerate axes.
    pub keep_degenerate: bool,
    /// Rest frequency override, Hz.
    pub rest_freq: f64,
}

// ============================================================================
// Image View
// ============================================================================

/// Channel/Stokes pair addressing one image plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationFrame {
    /// Channel index.
    pub channel: i32,
    /// Stokes index.
    pub stokes: i32,
}

/// Requests raster tiles of the current plane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddRequiredTiles {
    /// Image the tiles belong to.
    pub file_id: i32,
    /// Encoded tile coordinates.
    pub tiles: Vec<i32>,
    /// Compression to use.
    pub compression_type: CompressionType,
    /// Compression quality.
    pub compression_quality: f32,
}

/// Cancels pending raster tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveRequiredTiles {
    /// Image the tiles belong to.
    pub file_id: i32,
    /// Encoded tile coordinates.
    pub tiles: Vec<i32>,
}

/// Selects the channel and Stokes plane of an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetImageChannels {
    /// Image to update.
    pub file_id: i32,
    /// Channel index.
    pub channel: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Tiles to send for the new plane.
    pub required_tiles: AddRequiredTiles,
}

/// Moves the cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetCursor {
    /// Image under the cursor.
    pub file_id: i32,
    /// Cursor position.
    pub point: Point,
    /// Cursor spatial profiles to update together with the move.
    pub spatial_requirements: Option<SetSpatialRequirements>,
}

/// Starts channel animation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartAnimation {
    /// Animated image.
    pub file_id: i32,
    /// First frame of the range.
    pub first_frame: AnimationFrame,
    /// Frame to start from.
    pub start_frame: AnimationFrame,
    /// Last frame of the range.
    pub last_frame: AnimationFrame,
    /// Step between frames.
    pub delta_frame: AnimationFrame,
    /// Tiles to send per frame.
    pub required_tiles: AddRequiredTiles,
    /// Loop at the end of the range.
    pub looping: bool,
    /// Bounce back at the end of the range.
    pub reverse: bool,
    /// Frames per second.
    pub frame_rate: i32,
}

/// Stops channel animation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopAnimation {
    /// Animated image.
    pub file_id: i32,
    /// Frame to stop on.
    pub end_frame: AnimationFrame,
}

/// Acknowledges a rendered animation frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationFlowControl {
    /// Animated image.
    pub file_id: i32,
    /// Frame that was received.
    pub received_frame: AnimationFrame,
    /// Animation the frame belongs to.
    pub animation_id: i32,
    /// Client timestamp, ms.
    pub timestamp: i64,
}

// ============================================================================
// Regions
// ============================================================================

/// Creates (`region_id` < 0) or updates a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetRegion {
    /// Image the region is defined on.
    pub file_id: i32,
    /// Region id, or -1 to allocate a new one.
    pub region_id: i32,
    /// Geometry.
    pub region_info: RegionInfo,
    /// Preview-only region (PV preview).
    pub preview_region: bool,
}

/// Removes a region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveRegion {
    /// Region to remove.
    pub region_id: i32,
}

/// Lists region files in a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionListRequest {
    /// Directory, relative to the backend's root.
    pub directory: String,
    /// Filtering mode.
    pub filter_mode: FileListFilterMode,
}

/// Reads the contents of one region file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionFileInfoRequest {
    /// Directory of the file.
    pub directory: String,
    /// File name.
    pub file: String,
}

/// Imports regions from a file or from inline `contents`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportRegion {
    /// Image group the regions are attached to.
    pub group_id: i32,
    /// Region file format.
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Directory of the file.
    pub directory: String,
    /// File name; empty when `contents` is used.
    pub file: String,
    /// Inline file contents, one line per entry.
    pub contents: Vec<String>,
}

/// Exports regions to a file, or inline when `file` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportRegion {
    /// Region file format.
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Coordinate system of the output.
    pub coord_type: CoordinateType,
    /// Image the regions are defined on.
    pub file_id: i32,
    /// Regions to export, keyed by region id.
    pub region_styles: FxHashMap<i32, RegionStyle>,
    /// Output directory.
    pub directory: String,
    /// Output file name.
    pub file: String,
}

// ============================================================================
// Requirements
// ============================================================================

/// Statistic selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatsType {
    /// Number of valid pixels.
    #[default]
    NumPixels,
    /// Number of NaN pixels.
    NanCount,
    /// Sum.
    Sum,
    /// Flux density.
    FluxDensity,
    /// Mean.
    Mean,
    /// Root mean square.
    Rms,
    /// Standard deviation.
    Sigma,
    /// Sum of squares.
    SumSq,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Largest absolute value.
    Extrema,
}

/// One spatial profile to compute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpatialConfig {
    /// Axis and Stokes, e.g. `x`, `Qy`.
    pub coordinate: String,
    /// First pixel.
    pub start: i32,
    /// Last pixel (0 for full extent).
    pub end: i32,
    /// Decimation threshold.
    pub mip: i32,
    /// Line width in pixels (line regions).
    pub width: i32,
}

/// Configures spatial profiles of a region or the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetSpatialRequirements {
    /// Image.
    pub file_id: i32,
    /// Region (0 = cursor).
    pub region_id: i32,
    /// Profiles to compute; empty clears them.
    pub spatial_profiles: Vec<SpatialConfig>,
}

/// One histogram to compute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistogramConfig {
    /// Channel, -1 for current, -2 for all.
    pub channel: i32,
    /// Number of bins, -1 for automatic.
    pub num_bins: i32,
    /// Use explicit bounds instead of the data range.
    pub fixed_bounds: bool,
    /// Explicit bounds.
    pub bounds: FloatBounds,
}

/// Configures histograms of a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetHistogramRequirements {
    /// Image.
    pub file_id: i32,
    /// Region (-1 = whole image, -2 = cube).
    pub region_id: i32,
    /// Histograms to compute; empty clears them.
    pub histograms: Vec<HistogramConfig>,
}

/// One statistics configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsConfig {
    /// Stokes coordinate, e.g. `z`, `Iz`.
    pub coordinate: String,
    /// Statistics to compute.
    pub stats_types: Vec<StatsType>,
}

/// Configures statistics of a region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetStatsRequirements {
    /// Image.
    pub file_id: i32,
    /// Region (-1 = whole image).
    pub region_id: i32,
    /// Statistics to compute; empty clears them.
    pub stats_configs: Vec<StatsConfig>,
}

/// One spectral profile configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpectralConfig {
    /// Stokes coordinate, e.g. `z`, `Uz`.
    pub coordinate: String,
    /// Statistics to profile.
    pub stats_types: Vec<StatsType>,
}

/// Configures spectral profiles of a region or the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetSpectralRequirements {
    /// Image.
    pub file_id: i32,
    /// Region (0 = cursor).
    pub region_id: i32,
    /// Profiles to compute; empty clears them.
    pub spectral_profiles: Vec<SpectralConfig>,
}

// ============================================================================
// Contours and Vector Overlays
// ============================================================================

/// Contour smoothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmoothingMode {
    /// No smoothing.
    NoSmoothing,
    /// Block averaging.
    BlockAverage,
    /// Gaussian blur.
    #[default]
    GaussianBlur,
}

/// Configures contour generation; empty `levels` clears contours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetContourParameters {
    /// Image to contour.
    pub file_id: i32,
    /// Image whose grid the contours are computed on.
    pub reference_file_id: i32,
    /// Region of the image to contour.
    pub image_bounds: ImageBounds,
    /// Contour levels.
    pub levels: Vec<f64>,
    /// Smoothing mode.
    pub smoothing_mode: SmoothingMode,
    /// Smoothing kernel size.
    pub smoothing_factor: i32,
    /// Vertex decimation factor.
    pub decimation_factor: i32,
    /// Compression level of vertex data.
    pub compression_level: i32,
    /// Vertices per partial message.
    pub contour_chunk_size: i32,
}

/// Configures vector overlay generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetVectorOverlayParameters {
    /// Image.
    pub file_id: i32,
    /// Region of the image.
    pub image_bounds: ImageBounds,
    /// Block size.
    pub smoothing_factor: i32,
    /// Fractional polarization intensity.
    pub fractional: bool,
    /// Intensity threshold.
    pub threshold: f64,
    /// Apply debiasing.
    pub debiasing: bool,
    /// Stokes Q error for debiasing.
    pub q_error: f64,
    /// Stokes U error for debiasing.
    pub u_error: f64,
    /// Stokes index for intensity, -1 to disable.
    pub stokes_intensity: i32,
    /// Stokes index for angle, -1 to disable.
    pub stokes_angle: i32,
    /// Compression to use.
    pub compression_type: CompressionType,
    /// Compression quality.
    pub compression_quality: f32,
}

// ============================================================================
// Catalogs
// ============================================================================

/// Lists catalog files in a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogListRequest {
    /// Directory, relative to the backend's root.
    pub directory: String,
    /// Filtering mode.
    pub filter_mode: FileListFilterMode,
}

/// Requests header information of one catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFileInfoRequest {
    /// Directory of the file.
    pub directory: String,
    /// File name.
    pub name: String,
}

/// Opens a catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenCatalogFile {
    /// Directory of the file.
    pub directory: String,
    /// File name.
    pub name: String,
    /// Id the catalog is referred to by afterwards.
    pub file_id: i32,
    /// Rows included in the acknowledgement.
    pub preview_data_size: i32,
}

/// Closes a catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloseCatalogFile {
    /// Catalog to close.
    pub file_id: i32,
}

/// Requests a filtered subset of catalog rows.
///
/// Rows arrive as `CatalogFilterResponse` pushes until `progress` is 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilterRequest {
    /// Catalog.
    pub file_id: i32,
    /// Columns to return.
    pub column_indices: Vec<i32>,
    /// Rows to return, -1 for all.
    pub subset_data_size: i32,
    /// First row to return.
    pub subset_start_index: i32,
    /// Region to filter by, 0 for none.
    pub region_id: i32,
    /// Column to sort by.
    pub sort_column: String,
}

// ============================================================================
// Analysis
// ============================================================================

/// Moment image selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Moment {
    /// Mean value of the spectrum.
    #[default]
    MeanOfTheSpectrum,
    /// Integrated value of the spectrum.
    IntegratedOfTheSpectrum,
    /// Intensity weighted coordinate.
    IntensityWeightedCoord,
    /// Intensity weighted dispersion of the coordinate.
    IntensityWeightedDispersionOfTheCoord,
    /// Median value of the spectrum.
    MedianOfTheSpectrum,
    /// Median coordinate.
    MedianCoordinate,
    /// Standard deviation about the mean.
    StdAboutTheMeanOfTheSpectrum,
    /// Root mean square of the spectrum.
    RmsOfTheSpectrum,
    /// Absolute mean deviation.
    AbsMeanDeviationOfTheSpectrum,
    /// Maximum value.
    MaxOfTheSpectrum,
    /// Coordinate of the maximum.
    CoordOfTheMaxOfTheSpectrum,
    /// Minimum value.
    MinOfTheSpectrum,
    /// Coordinate of the minimum.
    CoordOfTheMinOfTheSpectrum,
}

/// Axis along which moments are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentAxis {
    /// Spatial axes.
    Spatial,
    /// Spectral axis.
    #[default]
    Spectral,
    /// Stokes axis.
    Stokes,
}

/// Pixel mask applied before computing moments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentMask {
    /// No mask.
    #[default]
    None,
    /// Include `pixel_range`.
    Include,
    /// Exclude `pixel_range`.
    Exclude,
}

/// Generates moment images.
///
/// Progress arrives as `MomentProgress` pushes; the response carries one
/// `OpenFileAck` per generated image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MomentRequest {
    /// Source image.
    pub file_id: i32,
    /// Moments to generate.
    pub moments: Vec<Moment>,
    /// Axis.
    pub axis: MomentAxis,
    /// Region to restrict to, 0 for the whole image.
    pub region_id: i32,
    /// Channel range.
    pub spectral_range: IntBounds,
    /// Mask mode.
    pub mask: MomentMask,
    /// Pixel range used by the mask.
    pub pixel_range: FloatBounds,
    /// Keep previously generated moment images open.
    pub keep: bool,
}

/// Cancels moment generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopMomentCalc {
    /// Source image.
    pub file_id: i32,
}

/// Settings of a live PV preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PvPreviewSettings {
    /// Preview id.
    pub preview_id: i32,
    /// Preview cut region.
    pub region_id: i32,
    /// Spatial rebinning.
    pub rebin_xy: i32,
    /// Spectral rebinning.
    pub rebin_z: i32,
    /// Compression to use.
    pub compression_type: CompressionType,
    /// Compression quality of the still image.
    pub image_compression_quality: f32,
    /// Compression quality while the cut is moving.
    pub animation_compression_quality: f32,
}

/// Generates a position-velocity image along a line region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PvRequest {
    /// Source image.
    pub file_id: i32,
    /// Line region of the cut.
    pub region_id: i32,
    /// Cut width in pixels.
    pub width: i32,
    /// Channel range, all when absent.
    pub spectral_range: Option<IntBounds>,
    /// Swap the output axes.
    pub reverse: bool,
    /// Keep previously generated PV images open.
    pub keep: bool,
    /// Generate a live preview instead of an image.
    pub preview_settings: Option<PvPreviewSettings>,
}

/// Cancels PV generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopPvCalc {
    /// Source image.
    pub file_id: i32,
}

/// Stops updating a PV preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopPvPreview {
    /// Preview id.
    pub preview_id: i32,
}

/// Releases a PV preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClosePvPreview {
    /// Preview id.
    pub preview_id: i32,
}

/// Point with double precision coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoublePoint {
    /// X.
    pub x: f64,
    /// Y.
    pub y: f64,
}

/// One 2D Gaussian component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GaussianComponent {
    /// Center, pixels.
    pub center: DoublePoint,
    /// Amplitude.
    pub amp: f64,
    /// Full width at half maximum along both axes, pixels.
    pub fwhm: DoublePoint,
    /// Position angle, degrees.
    pub pa: f64,
}

/// Fits Gaussian components to an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FittingRequest {
    /// Image to fit.
    pub file_id: i32,
    /// Initial guesses.
    pub initial_values: Vec<GaussianComponent>,
    /// Parameters held fixed, six per component plus the offset.
    pub fixed_params: Vec<bool>,
    /// Region to fit in, 0 for the field of view.
    pub region_id: i32,
    /// Field of view used when `region_id` is 0.
    pub fov_info: Option<RegionInfo>,
    /// Generate a model image.
    pub create_model_image: bool,
    /// Generate a residual image.
    pub create_residual_image: bool,
    /// Background offset.
    pub offset: f64,
}

/// Cancels fitting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopFitting {
    /// Image being fitted.
    pub file_id: i32,
}

// ============================================================================
// OutboundMessage
// ============================================================================

/// Binds outbound structs to the [`MessageType`] variant of the same name.
macro_rules! outbound {
    ($($name:ident),+ $(,)?) => {
        $(
            impl OutboundMessage for $name {
                const MESSAGE_TYPE: MessageType = MessageType::$name;
            }
        )+
    };
}

outbound! {
    RegisterViewer,
    ResumeSession,
    FileListRequest,
    StopFileList,
    FileInfoRequest,
    OpenFile,
    CloseFile,
    SaveFile,
    AddRequiredTiles,
    RemoveRequiredTiles,
    SetImageChannels,
    SetCursor,
    StartAnimation,
    StopAnimation,
    AnimationFlowControl,
    SetRegion,
    RemoveRegion,
    RegionListRequest,
    RegionFileInfoRequest,
    ImportRegion,
    ExportRegion,
    SetSpatialRequirements,
    SetHistogramRequirements,
    SetStatsRequirements,
    SetSpectralRequirements,
    SetContourParameters,
    SetVectorOverlayParameters,
    CatalogListRequest,
    CatalogFileInfoRequest,
    OpenCatalogFile,
    CloseCatalogFile,
    CatalogFilterRequest,
    MomentRequest,
    StopMomentCalc,
    PvRequest,
    StopPvCalc,
    StopPvPreview,
    ClosePvPreview,
    FittingRequest,
    StopFitting,
}

/// Pairs each request with the response that resolves it.
macro_rules! unary {
    ($($request:ident => $response:ident),+ $(,)?) => {
        $(
            impl UnaryRequest for $request {
                type Response = $response;
            }
        )+
    };
}

unary! {
    RegisterViewer => RegisterViewerAck,
    ResumeSession => ResumeSessionAck,
    FileListRequest => FileListResponse,
    FileInfoRequest => FileInfoResponse,
    OpenFile => OpenFileAck,
    SaveFile => SaveFileAck,
    SetRegion => SetRegionAck,
    RegionListRequest => RegionListResponse,
    RegionFileInfoRequest => RegionFileInfoResponse,
    ImportRegion => ImportRegionAck,
    ExportRegion => ExportRegionAck,
    CatalogListRequest => CatalogListResponse,
    CatalogFileInfoRequest => CatalogFileInfoResponse,
    OpenCatalogFile => OpenCatalogFileAck,
    MomentRequest => MomentResponse,
    PvRequest => PvResponse,
    FittingRequest => FittingResponse,
}

// ============================================================================
// Tests
// ============================================================================
