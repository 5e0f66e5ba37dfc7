use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsErrorKind};
use crate::fs::tree::TreeNode;

/// A request from the display side. Every command gets exactly one [`Reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Command {
    /// Walk the configured root and return the whole note tree.
    LoadTree,
    OpenFile {
        path: PathBuf,
    },
    /// Without a path, the content goes into a fresh untitled note in the root.
    SaveFile {
        #[serde(default)]
        path: Option<PathBuf>,
        content: String,
    },
    /// Create an empty note named `name` + extension.
    CreateNote {
        parent_path: PathBuf,
        name: String,
    },
    DeleteFile {
        path: PathBuf,
    },
    RenameFile {
        path: PathBuf,
        new_name: String,
    },
    CreateFolder {
        parent_path: PathBuf,
        name: String,
    },
    /// Recursive and irreversible.
    DeleteFolder {
        path: PathBuf,
    },
    SearchFiles {
        query: String,
        root_path: PathBuf,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::LoadTree => "load-tree",
            Command::OpenFile { .. } => "open-file",
            Command::SaveFile { .. } => "save-file",
            Command::CreateNote { .. } => "create-note",
            Command::DeleteFile { .. } => "delete-file",
            Command::RenameFile { .. } => "rename-file",
            Command::CreateFolder { .. } => "create-folder",
            Command::DeleteFolder { .. } => "delete-folder",
            Command::SearchFiles { .. } => "search-files",
        }
    }
}

/// The single terminal reply to a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Reply {
    TreeLoaded {
        root: TreeNode,
    },
    FileOpened {
        path: PathBuf,
        content: String,
    },
    FileSaved {
        path: PathBuf,
    },
    NoteCreated {
        path: PathBuf,
    },
    FileDeleted {
        path: PathBuf,
    },
    FileRenamed {
        new_path: PathBuf,
    },
    FolderCreated {
        path: PathBuf,
    },
    FolderDeleted {
        path: PathBuf,
    },
    FilesSearched {
        paths: Vec<PathBuf>,
        /// Directories the search could not read and skipped.
        #[serde(default)]
        skipped: Vec<PathBuf>,
    },
    Error {
        command: String,
        kind: FsErrorKind,
        message: String,
    },
}

impl Reply {
    pub fn error(command: &str, err: FsError) -> Self {
        Reply::Error {
            command: command.to_string(),
            kind: err.kind,
            message: err.message,
        }
    }

    /// Split off the error variant so callers can use `?`.
    pub fn into_result(self) -> Result<Reply, FsError> {
        match self {
            Reply::Error { kind, message, .. } => Err(FsError::new(kind, message)),
            other => Ok(other),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_wire_names_match_catalog() {
        let cmd = Command::RenameFile {
            path: PathBuf::from("/notes/todo.md"),
            new_name: "plans.md".into(),
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            value,
            json!({"command": "rename-file", "path": "/notes/todo.md", "newName": "plans.md"})
        );
        assert_eq!(cmd.name(), "rename-file");
    }

    #[test]
    fn save_file_path_is_optional_on_the_wire() {
        let cmd: Command =
            serde_json::from_value(json!({"command": "save-file", "content": "hi"})).unwrap();
        assert_eq!(
            cmd,
            Command::SaveFile {
                path: None,
                content: "hi".into()
            }
        );
    }

    #[test]
    fn unit_command_parses() {
        let cmd: Command = serde_json::from_str(r#"{"command":"load-tree"}"#).unwrap();
        assert_eq!(cmd, Command::LoadTree);
    }

    #[test]
    fn error_reply_carries_kind_and_message() {
        let reply = Reply::error(
            "delete-file",
            FsError::new(FsErrorKind::NotFound, "/notes/gone.md"),
        );
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            json!({
                "reply": "error",
                "command": "delete-file",
                "kind": "not-found",
                "message": "/notes/gone.md"
            })
        );
        let err = reply.into_result().unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotFound);
    }

    #[test]
    fn success_reply_passes_through_into_result() {
        let reply = Reply::FileSaved {
            path: PathBuf::from("/notes/a.md"),
        };
        assert!(!reply.is_error());
        assert_eq!(reply.clone().into_result().unwrap(), reply);
    }
}
