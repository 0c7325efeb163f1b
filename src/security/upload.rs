use serde::Serialize;
use sha2::{Digest, Sha256};

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 扩展名到 MIME 类型的映射
const MIME_TABLE: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("doc", "application/msword"),
    ("docx", DOCX),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", XLSX),
];

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "application/msword",
    DOCX,
    "application/vnd.ms-excel",
    XLSX,
];

const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// 上传的文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileInfo {
    pub mime_type: String,
    pub file_size: usize,
    pub file_hash: String,
    pub original_filename: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub file_info: Option<FileInfo>,
}

impl FileValidation {
    fn rejected(error: String) -> Self {
        Self {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
            file_info: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_file_size: usize,
    /// 校验文件头是否与扩展名对应的类型一致
    pub verify_signatures: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            verify_signatures: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileUploadSecurity {
    policy: UploadPolicy,
}

impl FileUploadSecurity {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn validate_file_upload(
        &self,
        file: Option<&UploadedFile>,
        bubble_id: &str,
        uploader_uid: &str,
    ) -> FileValidation {
        let Some(file) = file else {
            return FileValidation::rejected("No file provided".to_string());
        };

        let file_size = file.content.len();
        if file_size > self.policy.max_file_size {
            tracing::info!(bubble_id, uploader_uid, file_size, "Upload rejected: too large");
            return FileValidation::rejected(format!(
                "File size exceeds maximum allowed size of {}MB",
                self.policy.max_file_size / (1024 * 1024)
            ));
        }

        let filename = secure_filename(&file.filename);
        let mime_type = mime_type_for(&filename);
        if !ALLOWED_MIME_TYPES.contains(&mime_type) {
            tracing::info!(bubble_id, uploader_uid, mime_type, "Upload rejected: type not allowed");
            return FileValidation::rejected(format!("File type {} is not allowed", mime_type));
        }

        if self.policy.verify_signatures && !signature_matches(mime_type, &file.content) {
            tracing::warn!(
                bubble_id,
                uploader_uid,
                mime_type,
                "Upload rejected: content does not match extension"
            );
            return FileValidation::rejected(format!(
                "File content does not match declared type {}",
                mime_type
            ));
        }

        FileValidation {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            file_info: Some(FileInfo {
                mime_type: mime_type.to_string(),
                file_size,
                file_hash: hex::encode(Sha256::digest(&file.content)),
                original_filename: filename,
            }),
        }
    }
}

/// 文件名规范化：只保留 ASCII 字母、数字和 `_.-`，
/// 路径分隔符视为空白，空白替换为下划线，去掉首尾的 `.` 和 `_`
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// 根据扩展名推断 MIME 类型，未知扩展名返回 application/octet-stream
pub fn mime_type_for(filename: &str) -> &'static str {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return FALLBACK_MIME_TYPE;
    };
    let ext = ext.to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME_TYPE)
}

fn signature_matches(mime_type: &str, content: &[u8]) -> bool {
    match mime_type {
        "image/png" => content.starts_with(b"\x89PNG\r\n\x1a\n"),
        "image/jpeg" => content.starts_with(&[0xFF, 0xD8, 0xFF]),
        "image/gif" => content.starts_with(b"GIF87a") || content.starts_with(b"GIF89a"),
        "image/webp" => {
            content.len() >= 12 && content.starts_with(b"RIFF") && &content[8..12] == b"WEBP"
        }
        "application/pdf" => content.starts_with(b"%PDF-"),
        "application/msword" | "application/vnd.ms-excel" => content.starts_with(OLE2_MAGIC),
        DOCX | XLSX => content.starts_with(ZIP_MAGIC),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn validate(file: &UploadedFile) -> FileValidation {
        FileUploadSecurity::default().validate_file_upload(Some(file), "b1", "u1")
    }

    #[test]
    fn missing_file() {
        let result = FileUploadSecurity::default().validate_file_upload(None, "b1", "u1");
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["No file provided"]);
        assert!(result.file_info.is_none());
    }

    #[test]
    fn rejects_oversized_files() {
        let file = UploadedFile::new("notes.txt", vec![b'a'; MAX_FILE_SIZE + 1]);
        let result = validate(&file);
        assert_eq!(
            result.errors,
            vec!["File size exceeds maximum allowed size of 10MB"]
        );

        let file = UploadedFile::new("notes.txt", vec![b'a'; MAX_FILE_SIZE]);
        assert!(validate(&file).is_valid);
    }

    #[test]
    fn accepts_valid_png_with_file_info() {
        let file = UploadedFile::new("My Diagram.PNG", PNG_HEADER);
        let result = validate(&file);
        assert!(result.is_valid, "{:?}", result.errors);
        let info = result.file_info.unwrap();
        assert_eq!(info.mime_type, "image/png");
        assert_eq!(info.file_size, PNG_HEADER.len());
        assert_eq!(info.original_filename, "My_Diagram.PNG");
        assert_eq!(info.file_hash, hex::encode(Sha256::digest(PNG_HEADER)));
    }

    #[test]
    fn rejects_unknown_types() {
        let result = validate(&UploadedFile::new("run.exe", b"MZ".to_vec()));
        assert_eq!(
            result.errors,
            vec!["File type application/octet-stream is not allowed"]
        );
        let result = validate(&UploadedFile::new("README", b"hello".to_vec()));
        assert!(!result.is_valid);
    }

    #[test]
    fn rejects_mismatched_signatures() {
        let result = validate(&UploadedFile::new("photo.jpg", b"<html>".to_vec()));
        assert_eq!(
            result.errors,
            vec!["File content does not match declared type image/jpeg"]
        );

        let lenient = FileUploadSecurity::new(UploadPolicy {
            verify_signatures: false,
            ..UploadPolicy::default()
        });
        let file = UploadedFile::new("photo.jpg", b"<html>".to_vec());
        assert!(lenient.validate_file_upload(Some(&file), "b1", "u1").is_valid);
    }

    #[test]
    fn office_documents_use_container_signatures() {
        let docx = UploadedFile::new("essay.docx", b"PK\x03\x04rest".to_vec());
        assert!(validate(&docx).is_valid);
        let xls = UploadedFile::new("marks.xls", OLE2_MAGIC.to_vec());
        assert!(validate(&xls).is_valid);
        let text = UploadedFile::new("plan.txt", Vec::new());
        assert!(validate(&text).is_valid);
        let webp = UploadedFile::new("a.webp", b"RIFF\0\0\0\0WEBPVP8 ".to_vec());
        assert!(validate(&webp).is_valid);
    }

    #[test]
    fn normalizes_filenames() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_mluts.txt");
        assert_eq!(secure_filename("__.hidden._"), "hidden");
        assert_eq!(secure_filename("a$b%c.pdf"), "abc.pdf");
    }

    #[test]
    fn mime_lookup() {
        assert_eq!(mime_type_for("x.JPEG"), "image/jpeg");
        assert_eq!(mime_type_for("archive.tar.gz"), FALLBACK_MIME_TYPE);
        assert_eq!(mime_type_for("noext"), FALLBACK_MIME_TYPE);
    }
}
