//! CSV ledger of every attempted image.

use anyhow::{Context, Result};
use std::path::Path;

/// Ledger header, in column order.
pub const LEDGER_HEADER: [&str; 4] = ["Old Name", "URL", "New Name", "Folder Name"];

/// One ledger row: provenance of a single attempted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// `src` attribute exactly as it appeared in the page.
    pub original_src: String,
    /// Path component of the page URL the image came from.
    pub page_path: String,
    /// Local filename with extension.
    pub filename: String,
    /// Page subfolder the file was written into.
    pub folder: String,
}

impl ImageRecord {
    fn as_row(&self) -> [&str; 4] {
        [
            self.original_src.as_str(),
            self.page_path.as_str(),
            self.filename.as_str(),
            self.folder.as_str(),
        ]
    }
}

/// Writes the header and all `records` to `path`, replacing any previous ledger.
/// Rows end in CRLF, as spreadsheet tools expect.
pub fn write_ledger(path: &Path, records: &[ImageRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .with_context(|| format!("create ledger: {}", path.display()))?;
    writer.write_record(LEDGER_HEADER)?;
    for record in records {
        writer.write_record(record.as_row())?;
    }
    writer
        .flush()
        .with_context(|| format!("flush ledger: {}", path.display()))?;
    Ok(())
}
