use crate::foundation::error::{MemeError, MemeResult};

/// A base image offered by the template source.
///
/// Identity is the position in the source listing (`index`); the other descriptive fields are
/// optional because only the display URL is required to compose a meme.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    index: usize,
    display_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    box_count: Option<u32>,
}

impl Template {
    /// Create a template with only its position and URL.
    pub fn new(index: usize, display_url: impl Into<String>) -> Self {
        Self {
            index,
            display_url: display_url.into(),
            name: None,
            source_id: None,
            width: None,
            height: None,
            box_count: None,
        }
    }

    /// Build templates from URLs, indexed in iteration order.
    pub fn list_from_urls<I, S>(urls: I) -> Vec<Template>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .enumerate()
            .map(|(i, url)| Template::new(i, url))
            .collect()
    }

    /// Attach a human-readable name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the identifier the upstream service uses.
    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    /// Attach the advertised pixel size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Attach the number of text boxes the upstream service suggests.
    pub fn with_box_count(mut self, box_count: u32) -> Self {
        self.box_count = Some(box_count);
        self
    }

    /// Position in the source listing.
    pub fn index(&self) -> usize {
        self.index
    }

    /// URL the base image is displayed from.
    pub fn display_url(&self) -> &str {
        &self.display_url
    }

    /// Human-readable name, if the source provided one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Upstream identifier, if the source provided one.
    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Advertised `(width, height)`, if known.
    pub fn size(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }

    /// Suggested number of text boxes, if known.
    pub fn box_count(&self) -> Option<u32> {
        self.box_count
    }
}

/// Ordered, read-only list of templates for one session.
///
/// The default value is the empty catalog a session starts with before loading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    templates: Vec<Template>,
}

impl Catalog {
    /// Wrap a non-empty template list, preserving its order.
    pub fn new(templates: Vec<Template>) -> MemeResult<Self> {
        if templates.is_empty() {
            return Err(MemeError::EmptyCatalog);
        }
        Ok(Self { templates })
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// `true` before the catalog is loaded.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template at position `i`.
    pub fn get(&self, i: usize) -> Option<&Template> {
        self.templates.get(i)
    }

    /// Iterate in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }

    /// Borrow all templates in source order.
    pub fn as_slice(&self) -> &[Template] {
        &self.templates
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
