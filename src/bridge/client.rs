use std::path::{Path, PathBuf};

use tokio::sync::{mpsc, oneshot};

use super::backend::Backend;
use super::protocol::{Command, Reply};
use super::Request;
use crate::error::{AppError, Result};
use crate::fs::tree::TreeNode;

/// Typed access to the note store.
///
/// Implementors only provide [`Bridge::call`]; an error reply comes back as
/// `Err(AppError::Fs)`.
#[allow(async_fn_in_trait)]
pub trait Bridge {
    async fn call(&self, command: Command) -> Result<Reply>;

    async fn load_tree(&self) -> Result<TreeNode> {
        match self.call(Command::LoadTree).await? {
            Reply::TreeLoaded { root } => Ok(root),
            other => Err(unexpected("load-tree", &other)),
        }
    }

    /// Returns the path as resolved by the backend together with the text.
    async fn open_file(&self, path: &Path) -> Result<(PathBuf, String)> {
        let command = Command::OpenFile {
            path: path.to_path_buf(),
        };
        match self.call(command).await? {
            Reply::FileOpened { path, content } => Ok((path, content)),
            other => Err(unexpected("open-file", &other)),
        }
    }

    async fn save_file(&self, path: Option<&Path>, content: &str) -> Result<PathBuf> {
        let command = Command::SaveFile {
            path: path.map(Path::to_path_buf),
            content: content.to_string(),
        };
        match self.call(command).await? {
            Reply::FileSaved { path } => Ok(path),
            other => Err(unexpected("save-file", &other)),
        }
    }

    async fn create_note(&self, parent: &Path, name: &str) -> Result<PathBuf> {
        let command = Command::CreateNote {
            parent_path: parent.to_path_buf(),
            name: name.to_string(),
        };
        match self.call(command).await? {
            Reply::NoteCreated { path } => Ok(path),
            other => Err(unexpected("create-note", &other)),
        }
    }

    async fn delete_file(&self, path: &Path) -> Result<PathBuf> {
        let command = Command::DeleteFile {
            path: path.to_path_buf(),
        };
        match self.call(command).await? {
            Reply::FileDeleted { path } => Ok(path),
            other => Err(unexpected("delete-file", &other)),
        }
    }

    async fn rename_file(&self, path: &Path, new_name: &str) -> Result<PathBuf> {
        let command = Command::RenameFile {
            path: path.to_path_buf(),
            new_name: new_name.to_string(),
        };
        match self.call(command).await? {
            Reply::FileRenamed { new_path } => Ok(new_path),
            other => Err(unexpected("rename-file", &other)),
        }
    }

    async fn create_folder(&self, parent: &Path, name: &str) -> Result<PathBuf> {
        let command = Command::CreateFolder {
            parent_path: parent.to_path_buf(),
            name: name.to_string(),
        };
        match self.call(command).await? {
            Reply::FolderCreated { path } => Ok(path),
            other => Err(unexpected("create-folder", &other)),
        }
    }

    async fn delete_folder(&self, path: &Path) -> Result<PathBuf> {
        let command = Command::DeleteFolder {
            path: path.to_path_buf(),
        };
        match self.call(command).await? {
            Reply::FolderDeleted { path } => Ok(path),
            other => Err(unexpected("delete-folder", &other)),
        }
    }

    /// Matching file paths plus the directories that had to be skipped.
    async fn search_files(&self, query: &str, root: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let command = Command::SearchFiles {
            query: query.to_string(),
            root_path: root.to_path_buf(),
        };
        match self.call(command).await? {
            Reply::FilesSearched { paths, skipped } => Ok((paths, skipped)),
            other => Err(unexpected("search-files", &other)),
        }
    }
}

fn unexpected(command: &str, reply: &Reply) -> AppError {
    AppError::Bridge(format!("unexpected reply to {}: {:?}", command, reply))
}

/// The display side's handle on a running backend. Cheap to clone.
#[derive(Clone)]
pub struct BridgeClient {
    tx: mpsc::Sender<Request>,
}

impl BridgeClient {
    pub fn new(tx: mpsc::Sender<Request>) -> Self {
        Self { tx }
    }

    /// Send one command and wait for its reply, error replies included.
    pub async fn request(&self, command: Command) -> Result<Reply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request {
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| AppError::Bridge("backend is not running".to_string()))?;
        reply_rx
            .await
            .map_err(|_| AppError::Bridge("backend dropped the request".to_string()))
    }
}

impl Bridge for BridgeClient {
    async fn call(&self, command: Command) -> Result<Reply> {
        Ok(self.request(command).await?.into_result()?)
    }
}

/// Direct, in-thread access. The call blocks for the duration of the command.
impl Bridge for Backend {
    async fn call(&self, command: Command) -> Result<Reply> {
        Ok(self.handle(command).into_result()?)
    }
}
