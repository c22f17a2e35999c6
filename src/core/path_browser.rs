//! Folder picker for paths inside a remote workspace
//!
//! Paths are POSIX strings on the workspace side; nothing here touches the
//! local filesystem.

use async_trait::async_trait;

use crate::api::{ApiError, CoderWorkspace, Folder, FolderListing, Project};

/// Normalize user input into an absolute workspace path.
///
/// `~` expands to `home`, bare segments become absolute, `.`/`..` resolve and
/// duplicate or trailing slashes disappear. Blank input yields an empty string.
pub fn normalize_path(input: &str, home: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let expanded = if trimmed == "~" {
        home.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("~/") {
        format!("{}/{}", home.trim_end_matches('/'), rest)
    } else {
        trimmed.to_string()
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in expanded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Parent directory; the root is its own parent
pub fn parent_path(path: &str) -> String {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

pub fn join_path(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    format!("{}/{}", base, name.trim_matches('/'))
}

/// Link that opens a workspace's page so the user can start it
pub fn workspace_start_url(coder_base: &str, owner: &str, workspace: &str) -> String {
    format!(
        "{}/@{}/{}",
        coder_base.trim_end_matches('/'),
        owner,
        workspace
    )
}

/// Everything needed to list folders of one workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceTarget {
    pub account_id: String,
    pub workspace_id: String,
    pub workspace_ref: Option<String>,
    /// Where `~` points
    pub home: String,
    /// Page to start a stopped workspace, when the owner is known
    pub start_url: Option<String>,
}

impl WorkspaceTarget {
    pub fn new(account_id: impl Into<String>, workspace_id: impl Into<String>, home: &str) -> Self {
        Self {
            account_id: account_id.into(),
            workspace_id: workspace_id.into(),
            workspace_ref: None,
            home: home.to_string(),
            start_url: None,
        }
    }

    /// Target for a project's linked workspace, if it has one
    pub fn for_project(project: &Project, fallback_account: Option<&str>, home: &str) -> Option<Self> {
        let workspace_id = project.workspace_id.as_deref().filter(|id| !id.is_empty())?;
        let account_id = project
            .coder_account_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or(fallback_account)?;
        let mut target = Self::new(account_id, workspace_id, home);
        target.workspace_ref = project.workspace_ref.clone().filter(|r| !r.is_empty());
        Some(target)
    }

    /// Target for a workspace picked from the integrations list
    pub fn for_workspace(
        account_id: &str,
        workspace: &CoderWorkspace,
        coder_base: Option<&str>,
        home: &str,
    ) -> Self {
        let mut target = Self::new(account_id, workspace.id.clone(), home);
        target.workspace_ref = workspace.workspace_ref.clone().filter(|r| !r.is_empty());
        if let (Some(base), Some(owner), Some(name)) =
            (coder_base, workspace.owner_name.as_deref(), workspace.name.as_deref())
        {
            target.start_url = Some(workspace_start_url(base, owner, name));
        }
        target
    }
}

/// Anything that can list folders inside a workspace
#[async_trait]
pub trait FolderSource: Send + Sync {
    async fn list_folders(&self, target: &WorkspaceTarget, path: &str) -> Result<FolderListing, ApiError>;
}

/// What the browser currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseState {
    Idle,
    Loading { path: String },
    Listing(FolderListing),
    /// Workspace is stopped or its agent is disconnected (HTTP 409)
    Unreachable {
        message: String,
        start_url: Option<String>,
    },
    Failed { message: String },
}

/// Where to begin browsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLocation {
    /// Open exactly this path
    Exact(String),
    /// Probe these in order
    Probe(Vec<String>),
}

/// Decide the starting location from the project's saved path
pub fn starting_location(saved: Option<&str>, preferred: &[String], home: &str) -> StartLocation {
    match saved {
        Some(path) => {
            let normalized = normalize_path(path, home);
            if normalized.is_empty() {
                StartLocation::Exact("/".to_string())
            } else {
                StartLocation::Exact(normalized)
            }
        }
        None => {
            let mut candidates: Vec<String> = Vec::new();
            for path in preferred {
                let normalized = normalize_path(path, home);
                if !normalized.is_empty() && !candidates.contains(&normalized) {
                    candidates.push(normalized);
                }
            }
            if candidates.is_empty() {
                candidates.push("/".to_string());
            }
            StartLocation::Probe(candidates)
        }
    }
}

/// Browser state plus the path the user is standing in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBrowser {
    pub target: WorkspaceTarget,
    pub current_path: String,
    pub state: BrowseState,
    /// Highlighted row in the folder list
    pub selected: usize,
}

impl PathBrowser {
    pub fn new(target: WorkspaceTarget) -> Self {
        Self {
            target,
            current_path: "/".to_string(),
            state: BrowseState::Idle,
            selected: 0,
        }
    }

    /// Mark a fetch of `path` as in flight and return the normalized path
    pub fn begin(&mut self, path: &str) -> String {
        let normalized = match normalize_path(path, &self.target.home) {
            p if p.is_empty() => "/".to_string(),
            p => p,
        };
        self.state = BrowseState::Loading {
            path: normalized.clone(),
        };
        normalized
    }

    pub fn apply(&mut self, result: Result<FolderListing, ApiError>) {
        self.selected = 0;
        self.state = match result {
            Ok(listing) => {
                let path = normalize_path(&listing.path, &self.target.home);
                if !path.is_empty() {
                    self.current_path = path.clone();
                }
                BrowseState::Listing(FolderListing {
                    path: self.current_path.clone(),
                    folders: listing.folders,
                })
            }
            Err(err) => self.error_state(&err),
        };
    }

    fn error_state(&self, err: &ApiError) -> BrowseState {
        if err.is_conflict() {
            BrowseState::Unreachable {
                message: err.detail(),
                start_url: self.target.start_url.clone(),
            }
        } else {
            BrowseState::Failed {
                message: format!("Error loading folders: {}", err.detail()),
            }
        }
    }

    pub fn folders(&self) -> &[Folder] {
        match &self.state {
            BrowseState::Listing(listing) => &listing.folders,
            _ => &[],
        }
    }

    /// Path to fetch when the user opens `folder`
    pub fn child_path(&self, folder: &Folder) -> String {
        match folder.path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => normalize_path(path, &self.target.home),
            None => join_path(&self.current_path, &folder.name),
        }
    }

    /// Path to fetch for the highlighted folder
    pub fn selected_child(&self) -> Option<String> {
        self.folders().get(self.selected).map(|f| self.child_path(f))
    }

    pub fn parent(&self) -> String {
        parent_path(&self.current_path)
    }

    /// Current path, once a listing has confirmed it exists
    pub fn saveable_path(&self) -> Result<&str, String> {
        match &self.state {
            BrowseState::Listing(_) => Ok(&self.current_path),
            BrowseState::Unreachable { message, .. } | BrowseState::Failed { message } => {
                Err(message.clone())
            }
            BrowseState::Idle | BrowseState::Loading { .. } => {
                Err("Wait for the folder list to load".to_string())
            }
        }
    }

    pub fn select_next(&mut self) {
        let len = self.folders().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.folders().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Fetch `path` and apply the result
    pub async fn open<S: FolderSource + ?Sized>(&mut self, source: &S, path: &str) {
        let path = self.begin(path);
        let result = source.list_folders(&self.target, &path).await;
        self.apply(result);
    }

    /// Open the starting location, probing preferred paths when needed
    pub async fn open_start<S: FolderSource + ?Sized>(&mut self, source: &S, start: StartLocation) {
        match start {
            StartLocation::Exact(path) => self.open(source, &path).await,
            StartLocation::Probe(candidates) => {
                let result = probe_candidates(source, &self.target, &candidates).await;
                self.apply(result);
            }
        }
    }
}

/// Try candidates in order until one lists at least one folder.
///
/// Falls back to the first successful empty listing, then to the last error.
/// A conflict ends the probe at once since every path would fail the same way.
pub async fn probe_candidates<S: FolderSource + ?Sized>(
    source: &S,
    target: &WorkspaceTarget,
    candidates: &[String],
) -> Result<FolderListing, ApiError> {
    let mut first_empty: Option<FolderListing> = None;
    let mut last_error: Option<ApiError> = None;

    for path in candidates {
        match source.list_folders(target, path).await {
            Ok(listing) if !listing.folders.is_empty() => return Ok(listing),
            Ok(listing) => {
                tracing::debug!("Candidate {} is empty", path);
                if first_empty.is_none() {
                    first_empty = Some(listing);
                }
            }
            Err(err) if err.is_conflict() || err.is_unauthorized() => return Err(err),
            Err(err) => {
                tracing::debug!("Candidate {} failed: {}", path, err);
                last_error = Some(err);
            }
        }
    }

    match (first_empty, last_error) {
        (Some(listing), _) => Ok(listing),
        (None, Some(err)) => Err(err),
        (None, None) => Ok(FolderListing {
            path: "/".to_string(),
            folders: Vec::new(),
        }),
    }
}
