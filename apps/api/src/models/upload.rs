use serde::{Deserialize, Serialize};

/// Processing lifecycle of a file held by the remote AI service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileState {
    Uploading,
    Processing,
    Ready,
    Failed,
}

impl FileState {
    /// Maps the Files API `state` string. Unknown or absent states count as still uploading.
    pub fn from_wire(state: Option<&str>) -> Self {
        match state {
            Some("PROCESSING") => FileState::Processing,
            Some("ACTIVE") => FileState::Ready,
            Some("FAILED") => FileState::Failed,
            _ => FileState::Uploading,
        }
    }

    /// True while the remote side has not reached a terminal state.
    pub fn is_pending(self) -> bool {
        matches!(self, FileState::Uploading | FileState::Processing)
    }
}

/// Opaque reference to an uploaded file plus its last observed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadHandle {
    /// Identifier used for status queries, e.g. `files/abc-123`.
    pub name: Option<String>,
    pub state: FileState,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub display_name: Option<String>,
}
