//! Typed convenience calls for common ICD operations.
//!
//! Each helper builds the request from its arguments and awaits the
//! matching response through [`Client::request`]. Anything not covered
//! here goes through `request` or `send_command` directly.
//!
//! | Area | Calls |
//! |------|-------|
//! | Files | `file_list`, `file_info`, `open_file`, `close_file`, `save_file` |
//! | Regions | `set_region`, `remove_region`, `import_region`, `export_region`, `region_list`, `region_file_info` |
//! | Catalogs | `catalog_list`, `catalog_file_info`, `open_catalog_file`, `close_catalog_file` |
//! | Analysis | `moment`, `stop_moment`, `pv`, `stop_pv`, `fitting`, `stop_fitting` |
//! | Session | `resume_session`, `start_animation`, `stop_animation` |

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::protocol::{
    AnimationFrame, CatalogFileInfoRequest, CatalogFileInfoResponse, CatalogListRequest,
    CatalogListResponse, CloseCatalogFile, CloseFile, ExportRegion, ExportRegionAck,
    FileInfoRequest, FileInfoResponse, FileListFilterMode, FileListRequest, FileListResponse,
    FittingRequest, FittingResponse, ImportRegion, ImportRegionAck, MomentRequest,
    MomentResponse, OpenCatalogFile, OpenCatalogFileAck, OpenFile, OpenFileAck, PvRequest,
    PvResponse, RegionFileInfoRequest, RegionFileInfoResponse, RegionInfo, RegionListRequest,
    RegionListResponse, RemoveRegion, ResumeSession, ResumeSessionAck, SaveFile, SaveFileAck,
    SetRegion, SetRegionAck, StartAnimation, StopAnimation, StopFitting, StopMomentCalc,
    StopPvCalc,
};

use super::core::{Client, RequestOptions};

// ============================================================================
// Files
// ============================================================================

impl Client {
    /// Lists image files in `directory`.
    pub async fn file_list(&self, directory: impl Into<String>) -> Result<FileListResponse> {
        self.request(&FileListRequest {
            directory: directory.into(),
            filter_mode: FileListFilterMode::Content,
        })
        .await
    }

    /// Reads header information of one image.
    ///
    /// # Errors
    ///
    /// [`Error::Backend`](crate::Error::Backend) with the backend's message
    /// if the file cannot be read.
    pub async fn file_info(
        &self,
        directory: impl Into<String>,
        file: impl Into<String>,
        hdu: impl Into<String>,
    ) -> Result<FileInfoResponse> {
        self.request(&FileInfoRequest {
            directory: directory.into(),
            file: file.into(),
            hdu: hdu.into(),
        })
        .await
    }

    /// Opens an image under `file_id`.
    ///
    /// Concurrent opens are told apart by file id. Check `success` on the
    /// returned ack.
    pub async fn open_file(
        &self,
        directory: impl Into<String>,
        file: impl Into<String>,
        hdu: impl Into<String>,
        file_id: i32,
    ) -> Result<OpenFileAck> {
        let request = OpenFile {
            directory: directory.into(),
            file: file.into(),
            hdu: hdu.into(),
            file_id,
            ..Default::default()
        };
        self.request_with(
            &request,
            RequestOptions::new().matching(move |ack: &OpenFileAck| ack.file_id == file_id),
        )
        .await
    }

    /// Closes an image. `-1` closes every image.
    pub fn close_file(&self, file_id: i32) -> Result<()> {
        self.send_command(&CloseFile { file_id })
    }

    /// Saves an image, or a region of it, to disk.
    pub async fn save_file(&self, request: SaveFile) -> Result<SaveFileAck> {
        let file_id = request.file_id;
        self.request_with(
            &request,
            RequestOptions::new().matching(move |ack: &SaveFileAck| ack.file_id == file_id),
        )
        .await
    }
}

// ============================================================================
// Regions
// ============================================================================

impl Client {
    /// Creates (`region_id` < 1) or updates a region.
    pub async fn set_region(
        &self,
        file_id: i32,
        region_id: i32,
        region_info: RegionInfo,
    ) -> Result<SetRegionAck> {
        let request = SetRegion {
            file_id,
            region_id,
            region_info,
            preview_region: false,
        };
        if region_id > 0 {
            return self
                .request_with(
                    &request,
                    RequestOptions::new()
                        .matching(move |ack: &SetRegionAck| ack.region_id == region_id),
                )
                .await;
        }
        self.request(&request).await
    }

    /// Removes a region.
    pub fn remove_region(&self, region_id: i32) -> Result<()> {
        self.send_command(&RemoveRegion { region_id })
    }

    /// Imports regions from a file or inline contents.
    pub async fn import_region(&self, request: ImportRegion) -> Result<ImportRegionAck> {
        self.request(&request).await
    }

    /// Exports regions to a file or inline contents.
    pub async fn export_region(&self, request: ExportRegion) -> Result<ExportRegionAck> {
        self.request(&request).await
    }

    /// Lists region files in `directory`.
    pub async fn region_list(&self, directory: impl Into<String>) -> Result<RegionListResponse> {
        self.request(&RegionListRequest {
            directory: directory.into(),
            filter_mode: FileListFilterMode::Content,
        })
        .await
    }

    /// Reads one region file.
    pub async fn region_file_info(
        &self,
        directory: impl Into<String>,
        file: impl Into<String>,
    ) -> Result<RegionFileInfoResponse> {
        self.request(&RegionFileInfoRequest {
            directory: directory.into(),
            file: file.into(),
        })
        .await
    }
}

// ============================================================================
// Catalogs
// ============================================================================

impl Client {
    /// Lists catalog files in `directory`.
    pub async fn catalog_list(&self, directory: impl Into<String>) -> Result<CatalogListResponse> {
        self.request(&CatalogListRequest {
            directory: directory.into(),
            filter_mode: FileListFilterMode::Content,
        })
        .await
    }

    /// Reads the header of one catalog file.
    pub async fn catalog_file_info(
        &self,
        directory: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<CatalogFileInfoResponse> {
        self.request(&CatalogFileInfoRequest {
            directory: directory.into(),
            name: name.into(),
        })
        .await
    }

    /// Opens a catalog file.
    pub async fn open_catalog_file(&self, request: OpenCatalogFile) -> Result<OpenCatalogFileAck> {
        let file_id = request.file_id;
        self.request_with(
            &request,
            RequestOptions::new().matching(move |ack: &OpenCatalogFileAck| ack.file_id == file_id),
        )
        .await
    }

    /// Closes a catalog file.
    pub fn close_catalog_file(&self, file_id: i32) -> Result<()> {
        self.send_command(&CloseCatalogFile { file_id })
    }
}

// ============================================================================
// Analysis
// ============================================================================

impl Client {
    /// Generates moment images.
    ///
    /// Progress arrives on the `MomentProgress` channel before the response.
    pub async fn moment(&self, request: MomentRequest) -> Result<MomentResponse> {
        self.request(&request).await
    }

    /// Cancels a moment calculation.
    pub fn stop_moment(&self, file_id: i32) -> Result<()> {
        self.send_command(&StopMomentCalc { file_id })
    }

    /// Generates a position-velocity image.
    pub async fn pv(&self, request: PvRequest) -> Result<PvResponse> {
        self.request(&request).await
    }

    /// Cancels a position-velocity calculation.
    pub fn stop_pv(&self, file_id: i32) -> Result<()> {
        self.send_command(&StopPvCalc { file_id })
    }

    /// Fits Gaussian components to an image.
    pub async fn fitting(&self, request: FittingRequest) -> Result<FittingResponse> {
        self.request(&request).await
    }

    /// Cancels a fit.
    pub fn stop_fitting(&self, file_id: i32) -> Result<()> {
        self.send_command(&StopFitting { file_id })
    }
}

// ============================================================================
// Session
// ============================================================================

impl Client {
    /// Restores images, regions and catalogs of an earlier session.
    ///
    /// The backend pushes catch-up stream messages around the ack, so
    /// subscribe to them first.
    pub async fn resume_session(&self, request: ResumeSession) -> Result<ResumeSessionAck> {
        self.request(&request).await
    }

    /// Starts playing an animation.
    ///
    /// Fire-and-forget. The backend announces the animation id with a
    /// `StartAnimationAck` push, so subscribe to it first if it is needed.
    pub fn start_animation(&self, request: &StartAnimation) -> Result<()> {
        self.send_command(request)
    }

    /// Stops an animation at `end_frame`.
    pub fn stop_animation(&self, file_id: i32, end_frame: AnimationFrame) -> Result<()> {
        self.send_command(&StopAnimation { file_id, end_frame })
    }
}

// ============================================================================
// Tests
// ============================================================================
