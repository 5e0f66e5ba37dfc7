//! The privileged side of the bridge: the only code that touches the disk.
//!
//! Commands are handled one at a time to completion. Every failure, including
//! a panic inside a handler, becomes an error reply; the loop never exits
//! until the display side hangs up.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Component, Path, PathBuf};

use tokio::sync::mpsc;

use super::protocol::{Command, Reply};
use super::Request;
use crate::error::{FsError, FsErrorKind};
use crate::fs::adapter::{self, FsResult};
use crate::fs::search;
use crate::fs::tree::{self, TreeOptions};

/// Stem used for notes saved without a path.
pub const UNTITLED_STEM: &str = "Untitled";

pub struct Backend {
    root: PathBuf,
    options: TreeOptions,
}

impl Backend {
    /// `root` should already be canonical; every request path is checked
    /// against it.
    pub fn new(root: PathBuf, options: TreeOptions) -> Self {
        Self { root, options }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serve requests until every sender is dropped. Blocks the calling thread.
    pub fn run(self, mut rx: mpsc::Receiver<Request>) {
        tracing::info!(root = %self.root.display(), "backend started");
        while let Some(request) = rx.blocking_recv() {
            let reply = self.handle(request.command);
            if request.reply.send(reply).is_err() {
                tracing::debug!("requester went away before the reply");
            }
        }
        tracing::info!("backend stopped");
    }

    /// Handle one command, always producing exactly one reply.
    pub fn handle(&self, command: Command) -> Reply {
        let name = command.name();
        tracing::debug!(command = name, "command received");

        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(command))) {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(command = name, error = %err, "command failed");
                Reply::error(name, err)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(command = name, panic = %message, "command panicked");
                Reply::error(
                    name,
                    FsError::new(FsErrorKind::Other, format!("internal error: {}", message)),
                )
            }
        }
    }

    fn dispatch(&self, command: Command) -> FsResult<Reply> {
        match command {
            Command::LoadTree => {
                let root = tree::build(&self.root, &self.options)?;
                Ok(Reply::TreeLoaded { root })
            }
            Command::OpenFile { path } => {
                let path = self.confine(&path)?;
                let content = adapter::read_file(&path)?;
                Ok(Reply::FileOpened { path, content })
            }
            Command::SaveFile { path, content } => {
                let path = match path {
                    Some(path) => self.confine(&path)?,
                    None => adapter::resolve_collision(
                        &self
                            .root
                            .join(format!("{}.{}", UNTITLED_STEM, self.options.extension)),
                    ),
                };
                adapter::write_file(&path, &content)?;
                Ok(Reply::FileSaved { path })
            }
            Command::CreateNote { parent_path, name } => {
                let parent = self.confine(&parent_path)?;
                adapter::validate_name(&name)?;
                let file_name = format!("{}.{}", name, self.options.extension);
                let path = adapter::create_file(&parent, &file_name)?;
                Ok(Reply::NoteCreated { path })
            }
            Command::DeleteFile { path } => {
                let path = self.confine_below_root(&path)?;
                adapter::delete_file(&path)?;
                Ok(Reply::FileDeleted { path })
            }
            Command::RenameFile { path, new_name } => {
                let path = self.confine_below_root(&path)?;
                let new_path = adapter::rename_file(&path, &new_name)?;
                Ok(Reply::FileRenamed { new_path })
            }
            Command::CreateFolder { parent_path, name } => {
                let parent = self.confine(&parent_path)?;
                let path = adapter::create_directory(&parent, &name)?;
                Ok(Reply::FolderCreated { path })
            }
            Command::DeleteFolder { path } => {
                let path = self.confine_below_root(&path)?;
                adapter::delete_directory_recursive(&path)?;
                tracing::info!(path = %path.display(), "folder deleted recursively");
                Ok(Reply::FolderDeleted { path })
            }
            Command::SearchFiles { query, root_path } => {
                let root = self.confine(&root_path)?;
                let outcome = search::search(&query, &root)?;
                Ok(Reply::FilesSearched {
                    paths: outcome.matches,
                    skipped: outcome.skipped,
                })
            }
        }
    }

    /// Accept `path` only if it lies inside the root (the root itself included),
    /// both as written and once symlinks are resolved.
    fn confine(&self, path: &Path) -> FsResult<PathBuf> {
        self.confine_lexically(path)?;
        self.ensure_resolves_inside(path)?;
        Ok(path.to_path_buf())
    }

    /// Like [`Backend::confine`], but the root itself is refused.
    ///
    /// Used for commands that act on the entry and not on what it links to, so
    /// only the parent has to resolve inside the root.
    fn confine_below_root(&self, path: &Path) -> FsResult<PathBuf> {
        self.confine_lexically(path)?;
        let parent = match path.parent() {
            Some(parent) if path != self.root => parent,
            _ => return Err(FsError::invalid_path("the notes root cannot be changed")),
        };
        self.ensure_resolves_inside(parent)?;
        Ok(path.to_path_buf())
    }

    fn confine_lexically(&self, path: &Path) -> FsResult<()> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir));
        if escapes || !path.is_absolute() || !path.starts_with(&self.root) {
            return Err(self.outside(path));
        }
        Ok(())
    }

    /// Resolve the nearest existing ancestor of `path` and check it is still
    /// under the root. A link that exists but cannot be resolved is refused,
    /// since writing through it could create its target anywhere.
    fn ensure_resolves_inside(&self, path: &Path) -> FsResult<()> {
        for ancestor in path.ancestors() {
            match ancestor.canonicalize() {
                Ok(real) if real.starts_with(&self.root) => return Ok(()),
                Ok(real) => {
                    tracing::warn!(
                        path = %path.display(),
                        resolved = %real.display(),
                        "request path resolves outside the root"
                    );
                    return Err(self.outside(path));
                }
                Err(_) if std::fs::symlink_metadata(ancestor).is_ok() => {
                    return Err(FsError::invalid_path(format!(
                        "{} cannot be resolved",
                        ancestor.display()
                    )));
                }
                Err(_) => continue,
            }
        }
        Err(self.outside(path))
    }

    fn outside(&self, path: &Path) -> FsError {
        FsError::invalid_path(format!(
            "{} is outside {}",
            path.display(),
            self.root.display()
        ))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
