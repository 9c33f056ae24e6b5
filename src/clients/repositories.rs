//! Repository endpoints.

use crate::clients::models::{contents_from_value, Repository, RepositoryContent};
use crate::connection::{get_as, ApiConnection};
use crate::error::{require_non_blank, Result};
use crate::graph::{erase, AnyInstance};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait RepositoriesClient: Send + Sync {
    /// File and directory contents
    fn content(&self) -> Arc<dyn RepositoryContentsClient>;

    async fn get(&self, owner: &str, name: &str) -> Result<Repository>;
}

#[async_trait]
pub trait RepositoryContentsClient: Send + Sync {
    /// Entries at `path` on the default branch; a file yields a single entry
    async fn get_all_contents(&self, owner: &str, name: &str, path: &str)
        -> Result<Vec<RepositoryContent>>;

    /// Entries at `path` on the given branch, tag or commit
    async fn get_all_contents_by_ref(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<RepositoryContent>>;
}

fn repository_path(owner: &str, name: &str) -> Result<String> {
    require_non_blank("owner", owner)?;
    require_non_blank("name", name)?;
    Ok(format!("repos/{}/{}", owner, name))
}

pub struct RepositoriesApi {
    api: Arc<dyn ApiConnection>,
    content: Arc<dyn RepositoryContentsClient>,
}

impl RepositoriesApi {
    pub fn new(api: Arc<dyn ApiConnection>) -> Self {
        Self {
            content: Arc::new(RepositoryContentsApi::new(api.clone())),
            api,
        }
    }

    pub(crate) fn construct(api: Arc<dyn ApiConnection>) -> AnyInstance {
        erase::<dyn RepositoriesClient>(Arc::new(Self::new(api)))
    }
}

#[async_trait]
impl RepositoriesClient for RepositoriesApi {
    fn content(&self) -> Arc<dyn RepositoryContentsClient> {
        self.content.clone()
    }

    async fn get(&self, owner: &str, name: &str) -> Result<Repository> {
        let path = repository_path(owner, name)?;
        get_as(self.api.as_ref(), &path).await
    }
}

pub struct RepositoryContentsApi {
    api: Arc<dyn ApiConnection>,
}

impl RepositoryContentsApi {
    pub fn new(api: Arc<dyn ApiConnection>) -> Self {
        Self { api }
    }

    pub(crate) fn construct(api: Arc<dyn ApiConnection>) -> AnyInstance {
        erase::<dyn RepositoryContentsClient>(Arc::new(Self::new(api)))
    }

    async fn fetch(&self, resource: String) -> Result<Vec<RepositoryContent>> {
        let value = self.api.get(&resource).await?;
        contents_from_value(value)
    }
}

fn contents_path(owner: &str, name: &str, path: &str) -> Result<String> {
    let repository = repository_path(owner, name)?;
    require_non_blank("path", path)?;
    Ok(format!("{}/contents/{}", repository, path.trim_start_matches('/')))
}

#[async_trait]
impl RepositoryContentsClient for RepositoryContentsApi {
    async fn get_all_contents(
        &self,
        owner: &str,
        name: &str,
        path: &str,
    ) -> Result<Vec<RepositoryContent>> {
        self.fetch(contents_path(owner, name, path)?).await
    }

    async fn get_all_contents_by_ref(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<RepositoryContent>> {
        let resource = contents_path(owner, name, path)?;
        require_non_blank("reference", reference)?;
        self.fetch(format!("{}?ref={}", resource, reference)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::models::ContentType;
    use crate::connection::DefaultApiConnection;
    use crate::error::OctowireError;
    use crate::test_support::{test_connection, RecordingTransport, StubResponse};
    use serde_json::json;

    fn api(transport: Arc<RecordingTransport>) -> Arc<dyn ApiConnection> {
        Arc::new(DefaultApiConnection::new(test_connection(transport)))
    }

    #[tokio::test]
    async fn test_get_repository() {
        let transport = RecordingTransport::new(vec![StubResponse::ok(json!({
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "owner": { "login": "octocat", "id": 1 },
            "default_branch": "main"
        }))]);

        let repository = RepositoriesApi::new(api(transport.clone()))
            .get("octocat", "Hello-World")
            .await
            .unwrap();

        assert_eq!(repository.owner.login, "octocat");
        assert_eq!(repository.default_branch.as_deref(), Some("main"));
        assert!(transport
            .last_request()
            .unwrap()
            .url
            .ends_with("/repos/octocat/Hello-World"));
    }

    #[tokio::test]
    async fn test_blank_identifiers_are_rejected() {
        let transport = RecordingTransport::new(vec![]);
        let repositories = RepositoriesApi::new(api(transport.clone()));

        let err = repositories.get(" ", "Hello-World").await.unwrap_err();
        assert!(matches!(err, OctowireError::InvalidInput { parameter: "owner", .. }));

        let err = repositories
            .content()
            .get_all_contents("octocat", "Hello-World", "")
            .await
            .unwrap_err();
        assert!(matches!(err, OctowireError::InvalidInput { parameter: "path", .. }));

        let err = repositories
            .content()
            .get_all_contents_by_ref("octocat", "Hello-World", "README.md", "")
            .await
            .unwrap_err();
        assert!(matches!(err, OctowireError::InvalidInput { parameter: "reference", .. }));

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_contents_by_ref() {
        let transport = RecordingTransport::new(vec![StubResponse::ok(json!([
            { "name": "lib.rs", "path": "src/lib.rs", "sha": "abc", "size": 10, "type": "file" },
            { "name": "bin", "path": "src/bin", "sha": "def", "type": "dir" }
        ]))]);

        let contents = RepositoryContentsApi::new(api(transport.clone()))
            .get_all_contents_by_ref("octocat", "Hello-World", "/src", "v1.0")
            .await
            .unwrap();

        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1].content_type, ContentType::Dir);
        assert!(transport
            .last_request()
            .unwrap()
            .url
            .ends_with("/repos/octocat/Hello-World/contents/src?ref=v1.0"));
    }

    #[tokio::test]
    async fn test_single_file_contents() {
        let transport = RecordingTransport::new(vec![StubResponse::ok(json!({
            "name": "README.md",
            "path": "README.md",
            "sha": "abc",
            "type": "file",
            "content": "aGk=",
            "encoding": "base64"
        }))]);

        let contents = RepositoryContentsApi::new(api(transport))
            .get_all_contents("octocat", "Hello-World", "README.md")
            .await
            .unwrap();

        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].decoded_content().unwrap().unwrap(), b"hi");
    }
}
