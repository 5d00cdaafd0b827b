//! Admin content uploads: which files are accepted and how many of each.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

pub const MAX_VIDEOS: usize = 10;
pub const MAX_RESOURCES: usize = 20;
pub const MAX_VIDEO_BYTES: u64 = 1024 * 1024 * 1024;

/// Extensions offered by the file picker.
pub const PICKER_EXTENSIONS: [&str; 4] = ["mp4", "pdf", "xlsx", "docx"];

const RESOURCE_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Video,
    Resource,
}

impl UploadKind {
    pub fn limit(self) -> usize {
        match self {
            UploadKind::Video => MAX_VIDEOS,
            UploadKind::Resource => MAX_RESOURCES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UploadKind::Video => "Videos",
            UploadKind::Resource => "Recursos",
        }
    }

    pub fn accepted_formats(self) -> &'static str {
        match self {
            UploadKind::Video => "MP4, max 1GB",
            UploadKind::Resource => "PDF, XLSX, DOCX",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    Unsupported { filename: String },
    TooLarge { filename: String, size_bytes: u64 },
    LimitReached { kind: UploadKind },
    Duplicate { filename: String },
    Unreadable { filename: String, reason: String },
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadRejection::Unsupported { filename } => {
                write!(f, "{filename}: formato no admitido")
            }
            UploadRejection::TooLarge {
                filename,
                size_bytes,
            } => write!(
                f,
                "{filename}: {} supera el máximo de 1 GB",
                human_readable_bytes(*size_bytes)
            ),
            UploadRejection::LimitReached { kind } => {
                write!(f, "{}: límite de {} alcanzado", kind.label(), kind.limit())
            }
            UploadRejection::Duplicate { filename } => write!(f, "{filename}: ya está en la lista"),
            UploadRejection::Unreadable { filename, reason } => {
                write!(f, "{filename}: no se pudo leer ({reason})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub path: PathBuf,
    pub filename: String,
    pub kind: UploadKind,
    pub size_bytes: u64,
}

pub fn classify_upload(path: &Path) -> Option<UploadKind> {
    let mime = mime_guess::from_path(path).first()?;
    let essence = mime.essence_str();
    if essence == "video/mp4" {
        Some(UploadKind::Video)
    } else if RESOURCE_MIME_TYPES.contains(&essence) {
        Some(UploadKind::Resource)
    } else {
        None
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, Default)]
pub struct UploadQueue {
    items: Vec<PendingUpload>,
}

impl UploadQueue {
    pub fn items(&self) -> &[PendingUpload] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, kind: UploadKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    pub fn add(&mut self, path: &Path, size_bytes: u64) -> Result<UploadKind, UploadRejection> {
        let filename = display_name(path);
        let kind = classify_upload(path).ok_or_else(|| UploadRejection::Unsupported {
            filename: filename.clone(),
        })?;
        if self.items.iter().any(|item| item.path == path) {
            return Err(UploadRejection::Duplicate { filename });
        }
        if kind == UploadKind::Video && size_bytes > MAX_VIDEO_BYTES {
            return Err(UploadRejection::TooLarge {
                filename,
                size_bytes,
            });
        }
        if self.count(kind) >= kind.limit() {
            return Err(UploadRejection::LimitReached { kind });
        }

        self.items.push(PendingUpload {
            path: path.to_path_buf(),
            filename,
            kind,
            size_bytes,
        });
        Ok(kind)
    }

    pub fn add_from_disk(&mut self, path: &Path) -> Result<UploadKind, UploadRejection> {
        let size_bytes = fs::metadata(path)
            .map_err(|err| UploadRejection::Unreadable {
                filename: display_name(path),
                reason: err.to_string(),
            })?
            .len();
        self.add(path, size_bytes)
    }

    pub fn remove(&mut self, index: usize) -> Option<PendingUpload> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Empties the queue, returning what it held.
    pub fn take_all(&mut self) -> Vec<PendingUpload> {
        std::mem::take(&mut self.items)
    }
}

pub fn human_readable_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b < KB => format!("{b} B"),
        b if b < MB => format_scaled_unit(b, KB, "KB"),
        b if b < GB => format_scaled_unit(b, MB, "MB"),
        b => format_scaled_unit(b, GB, "GB"),
    }
}

fn format_scaled_unit(bytes: u64, unit_size: u64, unit_label: &str) -> String {
    let value = bytes as f64 / unit_size as f64;
    let value_text = format!("{value:.1}");
    let compact_value = value_text.strip_suffix(".0").unwrap_or(&value_text);
    format!("{compact_value} {unit_label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(classify_upload(Path::new("intro.mp4")), Some(UploadKind::Video));
        assert_eq!(classify_upload(Path::new("guia.PDF")), Some(UploadKind::Resource));
        assert_eq!(
            classify_upload(Path::new("matriz.xlsx")),
            Some(UploadKind::Resource)
        );
        assert_eq!(
            classify_upload(Path::new("plantilla.docx")),
            Some(UploadKind::Resource)
        );
        assert_eq!(classify_upload(Path::new("foto.png")), None);
        assert_eq!(classify_upload(Path::new("sin_extension")), None);
    }

    #[test]
    fn rejects_oversized_videos() {
        let mut queue = UploadQueue::default();
        let err = queue
            .add(Path::new("/tmp/largo.mp4"), MAX_VIDEO_BYTES + 1)
            .expect_err("too large");
        assert!(matches!(err, UploadRejection::TooLarge { .. }));
        assert!(queue.is_empty());
        assert!(queue.add(Path::new("/tmp/ok.mp4"), MAX_VIDEO_BYTES).is_ok());
    }

    #[test]
    fn enforces_per_kind_limits() {
        let mut queue = UploadQueue::default();
        for index in 0..MAX_VIDEOS {
            queue
                .add(Path::new(&format!("/tmp/modulo_{index}.mp4")), 1024)
                .expect("video accepted");
        }
        let err = queue
            .add(Path::new("/tmp/extra.mp4"), 1024)
            .expect_err("video limit");
        assert_eq!(
            err,
            UploadRejection::LimitReached {
                kind: UploadKind::Video
            }
        );
        assert!(queue.add(Path::new("/tmp/guia.pdf"), 1024).is_ok());
        assert_eq!(queue.count(UploadKind::Video), MAX_VIDEOS);
        assert_eq!(queue.count(UploadKind::Resource), 1);
    }

    #[test]
    fn ignores_the_same_file_twice() {
        let mut queue = UploadQueue::default();
        queue.add(Path::new("/tmp/guia.pdf"), 10).expect("first");
        let err = queue.add(Path::new("/tmp/guia.pdf"), 10).expect_err("dup");
        assert_eq!(
            err.to_string(),
            "guia.pdf: ya está en la lista".to_string()
        );
    }

    #[test]
    fn take_all_empties_the_queue() {
        let mut queue = UploadQueue::default();
        queue.add(Path::new("/tmp/a.pdf"), 10).expect("a");
        queue.add(Path::new("/tmp/b.mp4"), 10).expect("b");
        assert_eq!(queue.take_all().len(), 2);
        assert!(queue.is_empty());
        assert!(queue.remove(0).is_none());
    }

    #[test]
    fn formats_sizes_readably() {
        assert_eq!(human_readable_bytes(0), "0 B");
        assert_eq!(human_readable_bytes(1536), "1.5 KB");
        assert_eq!(human_readable_bytes(2 * 1024 * 1024), "2 MB");
        assert_eq!(human_readable_bytes(MAX_VIDEO_BYTES), "1 GB");
    }

    #[test]
    fn unreadable_files_are_rejected() {
        let mut queue = UploadQueue::default();
        let err = queue
            .add_from_disk(Path::new("/nonexistent/academy/video.mp4"))
            .expect_err("missing file");
        assert!(matches!(err, UploadRejection::Unreadable { .. }));
    }
}
