use crate::error::{AdminError, Result};

/// Uploads larger than this are refused before any network call.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "xls", "xlsx"];

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Final path component of the name; directory parts are dropped.
    pub fn base_name(&self) -> &str {
        self.name.rsplit(['/', '\\']).next().unwrap_or_default()
    }

    pub fn extension(&self) -> String {
        file_extension(self.base_name())
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_extension(&self.extension())
    }

    /// Checks the size cap and the document allow-list. The extension is only
    /// consulted when the declared MIME type is not recognised.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(AdminError::UnsupportedFile("No file selected".into()));
        }
        if matches!(self.base_name(), "" | "." | "..") {
            return Err(AdminError::UnsupportedFile(format!(
                "Invalid file name '{}'",
                self.name
            )));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AdminError::UnsupportedFile(
                "File size must be less than 10MB".into(),
            ));
        }
        if !ALLOWED_MIME_TYPES.contains(&self.content_type.as_str())
            && !ALLOWED_EXTENSIONS.contains(&self.extension().as_str())
        {
            return Err(AdminError::UnsupportedFile(
                "Invalid file type. Please upload PDF, Word, or Excel files only.".into(),
            ));
        }
        Ok(())
    }
}

/// Folder bucket a document is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Word,
    Excel,
    Other,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "pdf" => FileKind::Pdf,
            "doc" | "docx" => FileKind::Word,
            "xls" | "xlsx" => FileKind::Excel,
            _ => FileKind::Other,
        }
    }

    pub fn folder(self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Word => "word",
            FileKind::Excel => "excel",
            FileKind::Other => "other",
        }
    }
}

/// Lower-cased text after the last `.`; the whole name when there is none.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Selectable formats and the extensions each accepts.
pub fn allowed_formats() -> [(&'static str, &'static [&'static str]); 3] {
    [
        ("pdf", &[".pdf"]),
        ("doc", &[".doc", ".docx"]),
        ("excel", &[".xls", ".xlsx"]),
    ]
}

pub fn validate_file_format(file_name: &str, selected_format: &str) -> bool {
    let ext = format!(".{}", file_extension(file_name));
    allowed_formats()
        .iter()
        .find(|(format, _)| *format == selected_format)
        .is_some_and(|(_, extensions)| extensions.contains(&ext.as_str()))
}

/// Human readable size, e.g. `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
