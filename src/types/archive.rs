use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveResponse {
    pub success: bool,
    pub download_url: String,
    pub file_count: usize,
    pub archive_name: String,
    pub stations: Vec<String>,
    /// `"<start> - <end>"`
    pub period: String,
}
