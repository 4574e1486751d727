//! Takeout "Google Chat" archive layout and retrieval.
//!
//! The archive is a directory tree:
//!
//! ```text
//! <in_dir>/
//!   Users/<subdir>/user_info.json
//!   Groups/
//!     DM xxxx/      (direct message)
//!     Space yyyy/   (space / room)
//!       group_info.json
//!       messages.json
//!       <attachment files...>
//! ```

pub mod model;
pub mod timestamp;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use model::{GroupInfo, MessageFile, UserInfoFile};

const USERS_DIR: &str = "Users";
const GROUPS_DIR: &str = "Groups";
const USER_INFO_FILE: &str = "user_info.json";
const GROUP_INFO_FILE: &str = "group_info.json";
const MESSAGES_FILE: &str = "messages.json";

const DM_PREFIX: &str = "DM";
const SPACE_PREFIX: &str = "Space";

/// Takeout truncates attachment basenames on disk to this many characters
/// of stem, even though `export_name` in the JSON carries the full name.
const ATTACHMENT_STEM_LIMIT: usize = 47;

/// The exporting user, from `Users/<subdir>/user_info.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Dm,
    Space,
}

#[derive(Debug, Clone)]
pub struct ChatDir {
    pub path: PathBuf,
    pub kind: ChatKind,
}

impl ChatDir {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ExportError> {
    let raw = fs::read_to_string(path).map_err(|source| ExportError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ExportError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the exporting user's identity from the first `Users/` subdirectory.
pub fn load_user_identity(in_dir: &Path) -> Result<UserIdentity, ExportError> {
    let users_dir = in_dir.join(USERS_DIR);
    if !users_dir.is_dir() {
        return Err(ExportError::UsersDirMissing(in_dir.to_path_buf()));
    }
    let user_subdir = fs::read_dir(&users_dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| p.is_dir())
        .ok_or_else(|| ExportError::UserSubdirMissing(users_dir.clone()))?;
    let info: UserInfoFile = read_json(&user_subdir.join(USER_INFO_FILE))?;
    Ok(UserIdentity {
        name: info.user.name,
        email: info.user.email,
    })
}

/// Enumerate chat directories under `Groups/`, classified by name prefix.
/// Directories that are neither DMs nor spaces are logged and skipped.
/// Results are sorted by name so runs are deterministic.
pub fn chat_dirs(in_dir: &Path) -> Result<Vec<ChatDir>, ExportError> {
    let groups_dir = in_dir.join(GROUPS_DIR);
    if !groups_dir.is_dir() {
        return Err(ExportError::GroupsDirMissing(in_dir.to_path_buf()));
    }
    let mut chats = Vec::new();
    for entry in fs::read_dir(&groups_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let name = name.unwrap_or_default();
        let kind = if name.starts_with(DM_PREFIX) {
            log::debug!("{name} is a DM");
            ChatKind::Dm
        } else if name.starts_with(SPACE_PREFIX) {
            log::debug!("{name} is a space");
            ChatKind::Space
        } else {
            log::warn!("{name} is not a DM or a space, ignoring");
            continue;
        };
        chats.push(ChatDir { path, kind });
    }
    chats.sort_by_key(ChatDir::name);
    Ok(chats)
}

pub fn load_group_info(chat_dir: &Path) -> Result<GroupInfo, ExportError> {
    read_json(&chat_dir.join(GROUP_INFO_FILE))
}

/// Load a chat's messages, or `None` when the chat has no `messages.json`.
pub fn load_messages(chat_dir: &Path) -> Result<Option<MessageFile>, ExportError> {
    let path = chat_dir.join(MESSAGES_FILE);
    if !path.exists() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}

/// Broad attachment classification by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Embeddable image formats.
    Image,
    /// PDF documents; rendered as attachment links.
    Pdf,
    /// Everything else; rendered as attachment links.
    Other,
}

impl AttachmentKind {
    pub fn from_path(path: &Path) -> AttachmentKind {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "heic" | "dng" | "gif" | "eps" => AttachmentKind::Image,
            "pdf" => AttachmentKind::Pdf,
            _ => AttachmentKind::Other,
        }
    }
}

/// Maps an `export_name` from the JSON to the file Takeout actually wrote.
///
/// Basenames are truncated to a 47-character stem, and colliding truncated
/// names get `(1)`, `(2)`… suffixes in encounter order, so resolution is
/// stateful per chat directory.
#[derive(Debug, Default)]
pub struct AttachmentResolver {
    seen: HashMap<String, u32>,
}

impl AttachmentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, chat_dir: &Path, export_name: &str) -> PathBuf {
        let full = Path::new(export_name);
        let stem = full
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = full
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stem: String = stem.chars().take(ATTACHMENT_STEM_LIMIT).collect();
        let truncated = format!("{stem}{suffix}");
        match self.seen.get_mut(&truncated) {
            None => {
                self.seen.insert(truncated.clone(), 1);
                chat_dir.join(truncated)
            }
            Some(count) => {
                let numbered = format!("{stem}({count}){suffix}");
                *count += 1;
                chat_dir.join(numbered)
            }
        }
    }
}
