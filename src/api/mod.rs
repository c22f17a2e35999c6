//! Fulcrum REST API access

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::FulcrumClient;
pub use error::ApiError;
pub use types::*;

use crate::core::path_browser::{FolderSource, WorkspaceTarget};
use crate::core::pm_sync::ModelSource;

#[async_trait]
impl ModelSource for FulcrumClient {
    async fn models_for(&self, account_id: &str) -> Result<Vec<String>, ApiError> {
        self.chat_models(account_id).await
    }
}

#[async_trait]
impl FolderSource for FulcrumClient {
    async fn list_folders(
        &self,
        target: &WorkspaceTarget,
        path: &str,
    ) -> Result<FolderListing, ApiError> {
        self.coder_workspace_files(
            &target.account_id,
            &target.workspace_id,
            target.workspace_ref.as_deref(),
            path,
        )
        .await
    }
}
