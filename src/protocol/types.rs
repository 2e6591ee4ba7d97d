//! Structures shared by several ICD messages.
//!
//! Field names follow the ICD's camelCase schema. Every field has a
//! default, so a body that omits a field decodes the way a protobuf
//! message with an unset field would.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Geometry
// ============================================================================

/// Point in image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned pixel bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageBounds {
    /// Inclusive lower x.
    pub x_min: i32,
    /// Exclusive upper x.
    pub x_max: i32,
    /// Inclusive lower y.
    pub y_min: i32,
    /// Exclusive upper y.
    pub y_max: i32,
}

/// Integer range, used for channel ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntBounds {
    /// Lower bound.
    pub min: i32,
    /// Upper bound.
    pub max: i32,
}

/// Floating point range, used for pixel value ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatBounds {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

// ============================================================================
// Regions
// ============================================================================

/// Region shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegionType {
    /// Single point.
    #[default]
    Point,
    /// Straight line.
    Line,
    /// Open polyline.
    Polyline,
    /// Rectangle (center + size).
    Rectangle,
    /// Ellipse (center + semi-axes).
    Ellipse,
    /// Annulus.
    Annulus,
    /// Closed polygon.
    Polygon,
}

/// Geometry of a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionInfo {
    /// Shape.
    pub region_type: RegionType,
    /// Control points; their meaning depends on the shape.
    pub control_points: Vec<Point>,
    /// Rotation in degrees.
    pub rotation: f32,
}

/// Display style of a region, used by import/export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionStyle {
    /// Region label.
    pub name: String,
    /// Color, e.g. `#2EE6D6`.
    pub color: String,
    /// Line width in screen pixels.
    pub line_width: i32,
    /// Dash pattern.
    pub dash_list: Vec<i32>,
}

/// Coordinate system used when exporting regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinateType {
    /// Image pixels.
    #[default]
    Pixel,
    /// World coordinates.
    World,
}

// ============================================================================
// Files
// ============================================================================

/// File format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    /// CASA image.
    Casa,
    /// CASA region text format.
    Crtf,
    /// DS9 region format.
    Ds9Reg,
    /// FITS image.
    Fits,
    /// HDF5 image (IDIA schema).
    Hdf5,
    /// MIRIAD image.
    Miriad,
    /// Unrecognised.
    #[default]
    Unknown,
}

/// Basic information about one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInfo {
    /// File name.
    pub name: String,
    /// File format.
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Size in bytes.
    pub size: i64,
    /// HDU names (FITS only).
    pub hdu_list: Vec<String>,
    /// Modification time, seconds since the epoch.
    pub date: i64,
}

/// Basic information about one subdirectory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryInfo {
    /// Directory name.
    pub name: String,
    /// Number of entries.
    pub item_count: i32,
    /// Modification time, seconds since the epoch.
    pub date: i64,
}

/// One image header card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderEntry {
    /// Keyword.
    pub name: String,
    /// Value as text.
    pub value: String,
    /// Value as a number, when numeric.
    pub numeric_value: f64,
    /// Card comment.
    pub comment: String,
}

/// Extended image information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInfoExtended {
    /// Number of image dimensions.
    pub dimensions: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Number of spectral channels.
    pub depth: i32,
    /// Number of Stokes planes.
    pub stokes: i32,
    /// Raw header cards.
    pub header_entries: Vec<HeaderEntry>,
    /// Entries derived by the backend.
    pub computed_entries: Vec<HeaderEntry>,
}

/// Restoring beam of one channel/Stokes plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Beam {
    /// Channel index.
    pub channel: i32,
    /// Stokes index.
    pub stokes: i32,
    /// Major axis, arcsec.
    pub major_axis: f32,
    /// Minor axis, arcsec.
    pub minor_axis: f32,
    /// Position angle, degrees.
    pub pa: f32,
}

// ============================================================================
// Data
// ============================================================================

/// Tile and contour compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressionType {
    /// Uncompressed.
    #[default]
    None,
    /// ZFP floating point compression.
    Zfp,
    /// SZ compression.
    Sz,
}

/// Severity attached to backend error pushes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSeverity {
    /// Debugging detail.
    Debug,
    /// Informational.
    #[default]
    Info,
    /// Recoverable problem.
    Warning,
    /// Operation failed.
    Error,
    /// Backend is in trouble.
    Critical,
}

/// Catalog column data type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    /// Text.
    #[default]
    String,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// Boolean.
    Bool,
}

/// Header of one catalog column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogHeader {
    /// Column name.
    pub name: String,
    /// Column data type.
    pub data_type: ColumnType,
    /// Column index in the file.
    pub column_index: i32,
    /// Unit string.
    pub units: String,
    /// Free-form description.
    pub description: String,
}

/// Basic information about one catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFileInfo {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Description from the file header.
    pub description: String,
}

/// Values of one catalog column.
///
/// Only the vector matching the column type is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnData {
    /// Column data type.
    pub data_type: ColumnType,
    /// Text values.
    pub string_data: Vec<String>,
    /// Numeric values.
    pub double_data: Vec<f64>,
    /// Integer values.
    pub int_data: Vec<i64>,
    /// Boolean values.
    pub bool_data: Vec<bool>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_info_camel_case() {
        let info = RegionInfo {
            region_type: RegionType::Rectangle,
            control_points: vec![Point::new(10.0, 20.0), Point::new(4.0, 2.0)],
            rotation: 0.0,
        };
        let json = serde_json::to_value(&info).expect("serialize");
        assert_eq!(json["regionType"], "RECTANGLE");
        assert_eq!(json["controlPoints"][1]["x"], 4.0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let info: FileInfo = serde_json::from_str(r#"{"name": "M17.fits"}"#).expect("parse");
        assert_eq!(info.name, "M17.fits");
        assert_eq!(info.file_type, FileType::Unknown);
        assert!(info.hdu_list.is_empty());
    }

    #[test]
    fn test_file_type_field_renamed() {
        let info: FileInfo =
            serde_json::from_str(r#"{"name": "a.image", "type": "CASA"}"#).expect("parse");
        assert_eq!(info.file_type, FileType::Casa);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Debug < ErrorSeverity::Info);
    }
}
