//! Plan export: a paginated PDF and a base64 download link for it

pub mod pdf;

use base64::{Engine, engine::general_purpose::STANDARD};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::planner::PlanResult;

pub const EXPORT_FILE_NAME: &str = "travel_plan.pdf";

/// Write the plan as `travel_plan.pdf` inside `dir`; returns the file path and its bytes
pub fn write_pdf(result: &PlanResult, dir: &Path) -> Result<(PathBuf, Vec<u8>)> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let bytes = pdf::render_plan(result);
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Exported plan to {} ({} bytes)", path.display(), bytes.len());
    Ok((path, bytes))
}

/// HTML anchor that downloads the document as an attachment
pub fn data_uri_link(bytes: &[u8]) -> String {
    format!(
        r#"<a href="data:application/octet-stream;base64,{}" download="{}">Download PDF</a>"#,
        STANDARD.encode(bytes),
        EXPORT_FILE_NAME
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_pdf_uses_fixed_name() {
        let dir = tempdir().unwrap();
        let result: PlanResult = vec![("Flight Specialist".to_string(), "Direct flight".to_string())]
            .into_iter()
            .collect();

        let (path, bytes) = write_pdf(&result, &dir.path().join("out")).unwrap();

        assert_eq!(path.file_name().unwrap(), "travel_plan.pdf");
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_data_uri_link() {
        let link = data_uri_link(b"%PDF");
        assert_eq!(
            link,
            r#"<a href="data:application/octet-stream;base64,JVBERg==" download="travel_plan.pdf">Download PDF</a>"#
        );
    }
}
