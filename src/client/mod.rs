//! Gist API client implementation.

use crate::config::GistConfig;
use crate::errors::{GistError, GistErrorKind, GistResult};
use crate::types::{
    CreateGistRequest, Gist, GistFileContent, GistSummary, ListGistsParams, UpdateGistRequest,
};
use reqwest::{
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
    Client, Method, Response, StatusCode,
};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Accept header for JSON API endpoints.
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Accept header for raw-content downloads.
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

/// GitHub error response format.
#[derive(Debug, serde::Deserialize)]
struct GistErrorResponse {
    message: String,
}

/// Client for the GitHub Gist REST API.
///
/// Stateless between calls: one blocking round-trip per request, no retry
/// policy and no rate-limit awareness. Callers needing retries must wrap
/// their own.
pub struct GistClient {
    /// HTTP client.
    http: Client,
    /// Configuration.
    config: GistConfig,
}

impl GistClient {
    /// Creates a new Gist client.
    pub fn new(config: GistConfig) -> GistResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                GistError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { http, config })
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &GistConfig {
        &self.config
    }

    // Gist operations

    /// Creates a new gist containing a single file.
    ///
    /// Description and visibility come from the client configuration.
    pub async fn create_gist(&self, filename: &str, content: &str) -> GistResult<Gist> {
        let mut files = HashMap::new();
        files.insert(
            filename.to_string(),
            GistFileContent {
                content: content.to_string(),
            },
        );

        let request = CreateGistRequest {
            description: self.config.description.clone(),
            public: self.config.public,
            files,
        };

        self.request(Method::POST, "/gists", Some(&request)).await
    }

    /// Creates or updates a single file.
    ///
    /// With a gist id this issues a partial-update patch naming only the
    /// one file; the server merges it into the existing file set. The full
    /// file set is never fetched and resent. Without a gist id a new gist
    /// is created and the returned metadata carries the assigned id.
    pub async fn create_or_update_file(
        &self,
        filename: &str,
        content: &str,
        gist_id: Option<&str>,
    ) -> GistResult<Gist> {
        match gist_id {
            Some(id) => {
                let request = UpdateGistRequest::write_file(filename, content);
                self.request(Method::PATCH, &format!("/gists/{}", id), Some(&request))
                    .await
            }
            None => self.create_gist(filename, content).await,
        }
    }

    /// Fetches gist metadata, including per-file size, raw-content URL and
    /// declared content type.
    pub async fn fetch_gist(&self, gist_id: &str) -> GistResult<Gist> {
        self.request(
            Method::GET,
            &format!("/gists/{}", gist_id),
            Option::<&()>::None,
        )
        .await
    }

    /// Fetches the full content of every file in the gist.
    ///
    /// The metadata endpoint only returns a preview for large files, so
    /// each file is fetched from its raw-content URL in a second request,
    /// sequentially. If any single fetch fails the whole call fails with a
    /// download error naming that file; no partial map is returned.
    pub async fn fetch_file_contents(
        &self,
        gist_id: &str,
    ) -> GistResult<HashMap<String, String>> {
        let gist = self.fetch_gist(gist_id).await?;
        let mut contents = HashMap::with_capacity(gist.files.len());

        for (name, file) in &gist.files {
            let raw_url = file.raw_url.as_deref().ok_or_else(|| {
                GistError::new(
                    GistErrorKind::DownloadFailed,
                    format!("No raw URL for {}", name),
                )
                .with_path(name.clone())
            })?;

            let content = self.fetch_raw(name, raw_url).await?;
            contents.insert(name.clone(), content);
        }

        Ok(contents)
    }

    /// Lists gists of the authenticated user.
    pub async fn list_gists(&self, params: &ListGistsParams) -> GistResult<Vec<GistSummary>> {
        let query = serde_urlencoded::to_string(params).map_err(|e| {
            GistError::configuration(format!("Failed to serialize list parameters: {}", e))
        })?;

        let path = if query.is_empty() {
            "/gists".to_string()
        } else {
            format!("/gists?{}", query)
        };

        self.request(Method::GET, &path, Option::<&()>::None).await
    }

    /// Updates the gist description.
    pub async fn update_description(&self, gist_id: &str, description: &str) -> GistResult<Gist> {
        let request = UpdateGistRequest::describe(description);
        self.request(Method::PATCH, &format!("/gists/{}", gist_id), Some(&request))
            .await
    }

    /// Deletes the whole gist. Success is a 204 with no body.
    pub async fn delete_gist(&self, gist_id: &str) -> GistResult<()> {
        let url = self.build_url(&format!("/gists/{}", gist_id));
        self.execute(Method::DELETE, &url, Option::<&()>::None)
            .await?;
        Ok(())
    }

    /// Deletes a single file from the gist.
    ///
    /// Expressed as a partial update whose file entry is `null`, which the
    /// API interprets as a deletion.
    pub async fn delete_file(&self, gist_id: &str, filename: &str) -> GistResult<Gist> {
        let request = UpdateGistRequest::delete_file(filename);
        self.request(Method::PATCH, &format!("/gists/{}", gist_id), Some(&request))
            .await
    }

    /// Returns the raw-content URL of a file, or `None` if the gist has no
    /// file by that name.
    pub async fn raw_url(&self, gist_id: &str, filename: &str) -> GistResult<Option<String>> {
        let gist = self.fetch_gist(gist_id).await?;
        Ok(gist.files.get(filename).and_then(|f| f.raw_url.clone()))
    }

    /// Checks whether a gist id exists and is accessible with the
    /// configured token.
    ///
    /// An existence probe: HTTP 200 means accessible, anything else
    /// (including transport failures) means not accessible. The underlying
    /// cause is deliberately not surfaced.
    pub async fn is_accessible(&self, gist_id: &str) -> bool {
        let url = self.build_url(&format!("/gists/{}", gist_id));
        debug!(gist_id, "probing gist accessibility");

        match self.authorized(Method::GET, &url, ACCEPT_JSON).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(_) => false,
        }
    }

    /// Downloads every file in the gist into a local directory, creating
    /// it if needed. Returns the paths of the saved files.
    pub async fn download_to_dir(
        &self,
        gist_id: &str,
        directory: impl AsRef<Path>,
    ) -> GistResult<Vec<PathBuf>> {
        let directory = directory.as_ref();
        tokio::fs::create_dir_all(directory).await.map_err(|e| {
            GistError::new(
                GistErrorKind::Unknown,
                format!("Failed to create directory {}: {}", directory.display(), e),
            )
        })?;

        let files = self.fetch_file_contents(gist_id).await?;
        let mut saved = Vec::with_capacity(files.len());

        for (name, content) in files {
            let path = directory.join(&name);
            tokio::fs::write(&path, content).await.map_err(|e| {
                GistError::new(
                    GistErrorKind::Unknown,
                    format!("Failed to save file {}: {}", path.display(), e),
                )
                .with_path(name.clone())
            })?;
            saved.push(path);
        }

        Ok(saved)
    }

    // Internal methods

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> GistResult<T> {
        let url = self.build_url(path);
        let response = self.execute(method, &url, body).await?;

        response.json().await.map_err(|e| {
            GistError::deserialization(format!("Failed to deserialize response: {}", e))
        })
    }

    async fn execute<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> GistResult<Response> {
        debug!(%method, url, "issuing gist API request");

        let mut request = self.authorized(method, url, ACCEPT_JSON);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        Ok(response)
    }

    /// Fetches full file content from a raw-content URL.
    async fn fetch_raw(&self, filename: &str, raw_url: &str) -> GistResult<String> {
        debug!(filename, raw_url, "downloading raw file content");

        let response = self
            .authorized(Method::GET, raw_url, ACCEPT_RAW)
            .send()
            .await
            .map_err(|e| map_send_error(e).with_path(filename.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GistError::download(filename, status.as_u16()));
        }

        response.text().await.map_err(|e| {
            GistError::download(filename, status.as_u16()).with_cause(e)
        })
    }

    fn authorized(&self, method: Method, url: &str, accept: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.config.token.expose_secret()),
            )
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", &self.config.api_version)
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    async fn handle_error_response(response: Response) -> GistError {
        let status = response.status();
        let message = response
            .json::<GistErrorResponse>()
            .await
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("HTTP {} error", status.as_u16()));

        GistError::from_response(status.as_u16(), message)
    }
}

fn map_send_error(e: reqwest::Error) -> GistError {
    if e.is_timeout() {
        GistError::timeout(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        GistError::new(
            GistErrorKind::ConnectionFailed,
            format!("Connection failed: {}", e),
        )
    } else {
        GistError::new(GistErrorKind::Unknown, format!("Request failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GistConfig;

    fn test_client() -> GistClient {
        let config = GistConfig::builder()
            .token("ghp_test")
            .gist_id("a1b2c3")
            .build()
            .unwrap();
        GistClient::new(config).unwrap()
    }

    #[test]
    fn test_build_url() {
        let client = test_client();

        assert_eq!(
            client.build_url("/gists/a1b2c3"),
            "https://api.github.com/gists/a1b2c3"
        );
        assert_eq!(
            client.build_url("gists/a1b2c3"),
            "https://api.github.com/gists/a1b2c3"
        );
    }

    #[test]
    fn test_client_requires_valid_config() {
        let config = GistConfig::builder().token("ghp_test").build();
        assert!(config.is_err());
    }
}
