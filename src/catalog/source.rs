use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::model::Template;
use crate::foundation::error::{MemeError, MemeResult};

/// The public imgflip listing of popular meme templates.
pub const DEFAULT_TEMPLATE_ENDPOINT: &str = "https://api.imgflip.com/get_memes";

/// Supplies the template catalog. Queried once per session.
pub trait TemplateSource {
    /// Fetch all templates in source order.
    ///
    /// Transport failures and unexpected payload shapes are [`MemeError::CatalogLoad`]. An empty
    /// listing is returned as-is; the session decides that it is unusable.
    fn fetch_templates(&self) -> MemeResult<Vec<Template>>;

    /// Short description for logs and notices.
    fn describe(&self) -> String;
}

#[derive(serde::Deserialize)]
struct CatalogEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    data: Option<CatalogData>,
}

#[derive(serde::Deserialize)]
struct CatalogData {
    memes: Vec<RawTemplate>,
}

#[derive(serde::Deserialize)]
struct RawTemplate {
    url: String,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    box_count: Option<u32>,
}

/// Decode a `{ data: { memes: [ { url, .. } ] } }` listing.
///
/// Only `url` is required per entry. Array order is preserved and becomes each
/// [`Template::index`].
pub fn parse_catalog_json(bytes: &[u8]) -> MemeResult<Vec<Template>> {
    let env: CatalogEnvelope = serde_json::from_slice(bytes)
        .map_err(|e| MemeError::catalog_load(format!("template listing is not valid: {e}")))?;

    if env.success == Some(false) {
        let msg = env
            .error_message
            .unwrap_or_else(|| "source reported failure".to_string());
        return Err(MemeError::catalog_load(msg));
    }

    let data = env
        .data
        .ok_or_else(|| MemeError::catalog_load("template listing has no 'data' field"))?;

    let templates = data
        .memes
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let mut t = Template::new(i, raw.url);
            if let Some(name) = raw.name {
                t = t.with_name(name);
            }
            match raw.id {
                Some(serde_json::Value::String(s)) => t = t.with_source_id(s),
                Some(serde_json::Value::Number(n)) => t = t.with_source_id(n.to_string()),
                _ => {}
            }
            if let (Some(w), Some(h)) = (raw.width, raw.height) {
                t = t.with_size(w, h);
            }
            if let Some(n) = raw.box_count {
                t = t.with_box_count(n);
            }
            t
        })
        .collect();

    Ok(templates)
}

/// Fetches the listing with one blocking HTTP `GET`.
#[derive(Clone, Debug)]
pub struct HttpTemplateSource {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpTemplateSource {
    /// Create a source for `endpoint` with a request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> MemeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("memeforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MemeError::catalog_load(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The URL this source requests.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TemplateSource for HttpTemplateSource {
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    fn fetch_templates(&self) -> MemeResult<Vec<Template>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(|e| MemeError::catalog_load(format!("request '{}': {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MemeError::catalog_load(format!(
                "'{}' answered with status {status}",
                self.endpoint
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| MemeError::catalog_load(format!("read body of '{}': {e}", self.endpoint)))?;
        let templates = parse_catalog_json(&body)?;
        tracing::debug!(count = templates.len(), "fetched template listing");
        Ok(templates)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// Reads the listing from a JSON file with the same shape as the HTTP response.
#[derive(Clone, Debug)]
pub struct FileTemplateSource {
    path: PathBuf,
}

impl FileTemplateSource {
    /// Create a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateSource for FileTemplateSource {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn fetch_templates(&self) -> MemeResult<Vec<Template>> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            MemeError::catalog_load(format!("read '{}': {e}", self.path.display()))
        })?;
        parse_catalog_json(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/source.rs"]
mod tests;
