//! Unary responses.
//!
//! Each struct answers exactly one outbound request. Most carry
//! `success`/`message` and are handed to the caller as-is, so a failed
//! `OpenFileAck` is a normal value the caller inspects. The exception is
//! [`FileInfoResponse`], whose failure rejects the request with the
//! backend's message.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::identifiers::SessionId;

use super::request::GaussianComponent;
use super::types::{
    Beam, CatalogFileInfo, CatalogHeader, ColumnData, DirectoryInfo, FileInfo, FileInfoExtended,
    RegionInfo, RegionStyle,
};

// ============================================================================
// Session
// ============================================================================

/// Whether registration created a new session or resumed one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    /// Fresh session.
    #[default]
    New,
    /// Previously known session id.
    Resumed,
}

/// Acknowledges `RegisterViewer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterViewerAck {
    /// Session id assigned or confirmed by the backend.
    pub session_id: SessionId,
    /// Registration outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// New or resumed.
    pub session_type: SessionType,
    /// Feature flags supported by the backend.
    pub server_feature_flags: u32,
    /// Backend platform description.
    pub platform_strings: FxHashMap<String, String>,
}

/// Acknowledges `ResumeSession`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeSessionAck {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
}

// ============================================================================
// Files
// ============================================================================

/// Answers `FileListRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileListResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Listed directory.
    pub directory: String,
    /// Parent of the listed directory.
    pub parent: String,
    /// Image files.
    pub files: Vec<FileInfo>,
    /// Subdirectories.
    pub subdirectories: Vec<DirectoryInfo>,
    /// Listing was cancelled by `StopFileList`.
    pub cancel: bool,
}

/// Answers `FileInfoRequest`.
///
/// A failed lookup rejects the request with `message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInfoResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Basic information.
    pub file_info: Option<FileInfo>,
    /// Extended information keyed by HDU.
    pub file_info_extended: FxHashMap<String, FileInfoExtended>,
}

/// Acknowledges `OpenFile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenFileAck {
    /// Outcome.
    pub success: bool,
    /// Id of the opened image.
    pub file_id: i32,
    /// Failure reason.
    pub message: String,
    /// Basic information.
    pub file_info: Option<FileInfo>,
    /// Extended information.
    pub file_info_extended: Option<FileInfoExtended>,
    /// Restoring beams.
    pub beam_table: Vec<Beam>,
}

/// Acknowledges `SaveFile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveFileAck {
    /// Saved image.
    pub file_id: i32,
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
}

// ============================================================================
// Animation
// ============================================================================

/// Pushed after `StartAnimation` with the id later flow control refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartAnimationAck {
    /// Outcome.
    pub success: bool,
    /// Id of the started animation.
    pub animation_id: i32,
    /// Failure reason.
    pub message: String,
}

// ============================================================================
// Regions
// ============================================================================

/// Acknowledges `SetRegion`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetRegionAck {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Id of the created or updated region.
    pub region_id: i32,
}

/// Answers `RegionListRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionListResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Listed directory.
    pub directory: String,
    /// Parent of the listed directory.
    pub parent: String,
    /// Region files.
    pub files: Vec<FileInfo>,
    /// Subdirectories.
    pub subdirectories: Vec<DirectoryInfo>,
}

/// Answers `RegionFileInfoRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionFileInfoResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// File information.
    pub file_info: Option<FileInfo>,
    /// File contents, one entry per line.
    pub contents: Vec<String>,
}

/// Acknowledges `ImportRegion`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportRegionAck {
    /// Outcome.
    pub success: bool,
    /// Failure reason, or parse warnings.
    pub message: String,
    /// Imported regions keyed by new region id.
    pub regions: FxHashMap<i32, RegionInfo>,
    /// Styles of the imported regions.
    pub region_styles: FxHashMap<i32, RegionStyle>,
}

/// Acknowledges `ExportRegion`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportRegionAck {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Exported lines when no output file was given.
    pub contents: Vec<String>,
}

// ============================================================================
// Catalogs
// ============================================================================

/// Answers `CatalogListRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogListResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Listed directory.
    pub directory: String,
    /// Parent of the listed directory.
    pub parent: String,
    /// Catalog files.
    pub files: Vec<CatalogFileInfo>,
    /// Subdirectories.
    pub subdirectories: Vec<DirectoryInfo>,
}

/// Answers `CatalogFileInfoRequest`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFileInfoResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// File information.
    pub file_info: Option<CatalogFileInfo>,
    /// Column headers.
    pub headers: Vec<CatalogHeader>,
}

/// Acknowledges `OpenCatalogFile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenCatalogFileAck {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Id of the opened catalog.
    pub file_id: i32,
    /// File information.
    pub file_info: Option<CatalogFileInfo>,
    /// Total number of rows.
    pub data_size: i32,
    /// Column headers.
    pub headers: Vec<CatalogHeader>,
    /// Preview rows keyed by column index.
    pub preview_data: FxHashMap<i32, ColumnData>,
}

// ============================================================================
// Analysis
// ============================================================================

/// Answers `MomentRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MomentResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Generation was cancelled by `StopMomentCalc`.
    pub cancel: bool,
    /// One acknowledgement per generated image.
    pub open_file_acks: Vec<OpenFileAck>,
}

/// Answers `PvRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PvResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Acknowledgement of the generated image.
    pub open_file_ack: Option<OpenFileAck>,
    /// Generation was cancelled by `StopPvCalc`.
    pub cancel: bool,
}

/// Answers `FittingRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FittingResponse {
    /// Outcome.
    pub success: bool,
    /// Failure reason.
    pub message: String,
    /// Fitted components.
    pub result_values: Vec<GaussianComponent>,
    /// Errors of the fitted components.
    pub result_errors: Vec<GaussianComponent>,
    /// Fitted background offset.
    pub offset_value: f64,
    /// Error of the background offset.
    pub offset_error: f64,
    /// Solver log.
    pub log: String,
    /// Acknowledgement of the model image, if requested.
    pub model_image: Option<OpenFileAck>,
    /// Acknowledgement of the residual image, if requested.
    pub residual_image: Option<OpenFileAck>,
}

// ============================================================================
// Tests
// ============================================================================
