//! Query API boundary.
//!
//! `DashboardApi` is the seam between orchestration and transport. The
//! production implementation is [`HttpApi`]; tests substitute an in-memory
//! fake with controllable completion order.

mod error;
mod http;
mod query;

pub use error::ApiError;
pub use http::{HttpApi, UPLOAD_TIMEOUT};
pub use query::{filter_params, shortlist_params};

use std::future::Future;
use std::sync::Arc;

use probate_types::{AnalyzeResponse, Filters, ShortlistPage};
use serde_json::Value;

use crate::sources::ChartSource;

/// One shortlist request: filter snapshot, encoded sort and page.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortlistQuery {
    pub filters: Arc<Filters>,
    /// Wire-encoded sort (`col:dir,...`), empty when unsorted
    pub sort: String,
    pub page: u32,
    pub page_size: u32,
}

/// File contents sent as the multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub trait DashboardApi: Send + Sync + 'static {
    /// `GET /charts/<endpoint>` with the filter as query parameters. The raw
    /// payload is returned for the normalizer.
    fn fetch_chart(
        &self,
        source: ChartSource,
        filters: &Filters,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// `GET /shortlist`
    fn fetch_shortlist(
        &self,
        query: &ShortlistQuery,
    ) -> impl Future<Output = Result<ShortlistPage, ApiError>> + Send;

    /// `POST /upload`. Success carries no payload.
    fn upload(&self, file: UploadFile) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /analyze?max_records=N`
    fn analyze(
        &self,
        file: UploadFile,
        max_records: u32,
    ) -> impl Future<Output = Result<AnalyzeResponse, ApiError>> + Send;
}
