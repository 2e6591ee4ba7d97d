//! Push-only stream messages.
//!
//! These arrive unsolicited after the commands that configure them and
//! are fanned out to every subscriber of their channel. Several carry a
//! `progress` field in `[0, 1]`; partial messages precede the final one
//! with `progress == 1`.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::request::StatsType;
use super::types::{ColumnData, CompressionType, ErrorSeverity, ImageBounds};

// ============================================================================
// Histograms and Statistics
// ============================================================================

/// One histogram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Histogram {
    /// Channel the histogram covers.
    pub channel: i32,
    /// Number of bins.
    pub num_bins: i32,
    /// Bin width.
    pub bin_width: f64,
    /// Center of the first bin.
    pub first_bin_center: f64,
    /// Bin counts.
    pub bins: Vec<i32>,
    /// Mean of the data.
    pub mean: f64,
    /// Standard deviation of the data.
    pub std_dev: f64,
}

/// Histogram push for a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionHistogramData {
    /// Image.
    pub file_id: i32,
    /// Region (-1 = whole image, -2 = cube).
    pub region_id: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Completion in `[0, 1]`.
    pub progress: f32,
    /// Histograms.
    pub histograms: Vec<Histogram>,
}

/// One computed statistic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatisticsValue {
    /// Which statistic.
    pub stats_type: StatsType,
    /// Value.
    pub value: f64,
}

/// Statistics push for a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionStatsData {
    /// Image.
    pub file_id: i32,
    /// Region.
    pub region_id: i32,
    /// Channel.
    pub channel: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Statistics.
    pub statistics: Vec<StatisticsValue>,
}

// ============================================================================
// Profiles
// ============================================================================

/// One spatial profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpatialProfile {
    /// Axis and Stokes, e.g. `x`.
    pub coordinate: String,
    /// First pixel.
    pub start: i32,
    /// Last pixel.
    pub end: i32,
    /// Profile values.
    pub values: Vec<f32>,
    /// Decimation applied.
    pub mip: i32,
}

/// Spatial profile push for the cursor or a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpatialProfileData {
    /// Image.
    pub file_id: i32,
    /// Region (0 = cursor).
    pub region_id: i32,
    /// Cursor x.
    pub x: i32,
    /// Cursor y.
    pub y: i32,
    /// Channel.
    pub channel: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Pixel value at the cursor.
    pub value: f32,
    /// Profiles.
    pub profiles: Vec<SpatialProfile>,
}

/// One spectral profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpectralProfile {
    /// Stokes coordinate, e.g. `z`.
    pub coordinate: String,
    /// Statistic profiled.
    pub stats_type: StatsType,
    /// Profile values.
    pub values: Vec<f64>,
}

/// Spectral profile push, partial until `progress` reaches 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpectralProfileData {
    /// Image.
    pub file_id: i32,
    /// Region (0 = cursor).
    pub region_id: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Completion in `[0, 1]`.
    pub progress: f32,
    /// Profiles.
    pub profiles: Vec<SpectralProfile>,
}

// ============================================================================
// Raster Tiles
// ============================================================================

/// One compressed raster tile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TileData {
    /// Mip layer.
    pub layer: i32,
    /// Tile column.
    pub x: i32,
    /// Tile row.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Compressed pixel data.
    pub image_data: Vec<u8>,
    /// Run-length encoded NaN positions.
    pub nan_encodings: Vec<u8>,
}

/// Raster tile push.
///
/// Tiles of one transfer are bracketed by two [`RasterTileSync`] markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RasterTileData {
    /// Image.
    pub file_id: i32,
    /// Channel.
    pub channel: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Compression used.
    pub compression_type: CompressionType,
    /// Compression quality.
    pub compression_quality: f32,
    /// Animation the tile belongs to, 0 when not animating.
    pub animation_id: i32,
    /// Transfer the tile belongs to.
    pub sync_id: i32,
    /// Tiles.
    pub tiles: Vec<TileData>,
}

/// Start (`end_sync == false`) or end (`end_sync == true`) of a tile transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RasterTileSync {
    /// Image.
    pub file_id: i32,
    /// Channel.
    pub channel: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Transfer id.
    pub sync_id: i32,
    /// Animation id, 0 when not animating.
    pub animation_id: i32,
    /// Number of tiles in the transfer.
    pub tile_count: i32,
    /// `true` on the closing marker.
    pub end_sync: bool,
}

// ============================================================================
// Contours and Vector Overlays
// ============================================================================

/// Vertices of one contour level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContourSet {
    /// Contour level.
    pub level: f64,
    /// Vertex decimation applied.
    pub decimation_factor: i32,
    /// Encoded vertex coordinates.
    pub raw_coordinates: Vec<u8>,
    /// Start offsets of each polyline.
    pub raw_start_indices: Vec<i32>,
    /// Size of the decoded coordinates.
    pub uncompressed_coordinates_size: i32,
}

/// Contour push, partial until `progress` reaches 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContourImageData {
    /// Image.
    pub file_id: i32,
    /// Image the contours were computed on.
    pub reference_file_id: i32,
    /// Bounds of the contoured area.
    pub image_bounds: ImageBounds,
    /// Channel.
    pub channel: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Contour sets.
    pub contour_sets: Vec<ContourSet>,
    /// Completion in `[0, 1]`.
    pub progress: f64,
}

/// Vector overlay tile push, partial until `progress` reaches 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VectorOverlayTileData {
    /// Image.
    pub file_id: i32,
    /// Channel.
    pub channel: i32,
    /// Stokes index used for intensity.
    pub stokes_intensity: i32,
    /// Stokes index used for angle.
    pub stokes_angle: i32,
    /// Compression used.
    pub compression_type: CompressionType,
    /// Compression quality.
    pub compression_quality: f32,
    /// Intensity tiles.
    pub intensity_tiles: Vec<TileData>,
    /// Angle tiles.
    pub angle_tiles: Vec<TileData>,
    /// Completion in `[0, 1]`.
    pub progress: f64,
}

// ============================================================================
// Catalogs
// ============================================================================

/// Filtered catalog rows, partial until `progress` reaches 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilterResponse {
    /// Catalog.
    pub file_id: i32,
    /// Image the filter region belongs to.
    pub image_file_id: i32,
    /// Filter region.
    pub region_id: i32,
    /// Column data keyed by column index.
    pub columns: FxHashMap<i32, ColumnData>,
    /// Rows in this message.
    pub subset_data_size: i32,
    /// Index after the last row in this message.
    pub subset_end_index: i32,
    /// Completion in `[0, 1]`.
    pub progress: f32,
    /// Total rows passing the filter.
    pub filter_data_size: i32,
    /// Requested end index.
    pub request_end_index: i32,
}

// ============================================================================
// Progress
// ============================================================================

/// Moment generation progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MomentProgress {
    /// Source image.
    pub file_id: i32,
    /// Completion in `[0, 1]`.
    pub progress: f32,
}

/// PV generation progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PvProgress {
    /// Source image.
    pub file_id: i32,
    /// Completion in `[0, 1]`.
    pub progress: f32,
}

/// Fitting progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FittingProgress {
    /// Image being fitted.
    pub file_id: i32,
    /// Completion in `[0, 1]`.
    pub progress: f32,
}

/// Directory listing progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileListProgress {
    /// Entries checked so far.
    pub checked_count: i32,
    /// Total entries.
    pub total_count: i32,
    /// Completion in `[0, 1]`.
    pub percentage: f32,
}

/// PV preview image push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PvPreviewData {
    /// Preview id.
    pub preview_id: i32,
    /// Compressed image data.
    pub image_data: Vec<u8>,
    /// Run-length encoded NaN positions.
    pub nan_encodings: Vec<u8>,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Compression used.
    pub compression_type: CompressionType,
    /// Compression quality.
    pub compression_quality: f32,
}

// ============================================================================
// Errors
// ============================================================================

/// Backend error or warning push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorData {
    /// Severity.
    pub severity: ErrorSeverity,
    /// Free-form tags, e.g. `file`, `region`.
    pub tags: Vec<String>,
    /// Message text.
    pub message: String,
    /// Extra context.
    pub data: String,
}

// ============================================================================
// Tests
// ============================================================================
