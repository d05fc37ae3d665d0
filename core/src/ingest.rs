//! Loading spreadsheets for upload and analysis preview.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::api::{ApiError, UploadFile};

/// File extensions the ingestion endpoint accepts
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// Errors uploading or analyzing a file. Dashboard state is never touched
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{} is not a .csv, .xlsx or .xls file", path.display())]
    UnsupportedType { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },

    #[error("upload was rejected")]
    Api(#[from] ApiError),
}

pub fn is_accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// Read `path` into an upload body after checking its type.
pub async fn read_upload(path: &Path) -> Result<UploadFile, UploadError> {
    if !is_accepted(path) {
        return Err(UploadError::UnsupportedType {
            path: path.to_path_buf(),
        });
    }
    let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(UploadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    tracing::debug!(file = %file_name, bytes = bytes.len(), "read upload");
    Ok(UploadFile { file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_accepted_extensions() {
        assert!(is_accepted(Path::new("filings.csv")));
        assert!(is_accepted(Path::new("/tmp/Filings.XLSX")));
        assert!(is_accepted(Path::new("old.xls")));
        assert!(!is_accepted(Path::new("notes.txt")));
        assert!(!is_accepted(Path::new("csv")));
    }

    #[tokio::test]
    async fn test_read_upload_uses_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("march.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "case_no,county").unwrap();
        writeln!(file, "2024-ES-0001,Fulton").unwrap();

        let upload = read_upload(&path).await.unwrap();
        assert_eq!(upload.file_name, "march.csv");
        assert!(upload.bytes.starts_with(b"case_no,county"));
    }

    #[tokio::test]
    async fn test_read_upload_rejects_bad_input() {
        let dir = TempDir::new().unwrap();

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hello").unwrap();
        assert!(matches!(
            read_upload(&txt).await,
            Err(UploadError::UnsupportedType { .. })
        ));

        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, "").unwrap();
        assert!(matches!(read_upload(&empty).await, Err(UploadError::Empty { .. })));

        let missing = dir.path().join("missing.xlsx");
        assert!(matches!(read_upload(&missing).await, Err(UploadError::Read { .. })));
    }
}
