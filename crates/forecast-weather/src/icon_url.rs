use url::Url;

/// Maps weather icon identifiers to downloadable image URLs.
#[derive(Debug, Clone)]
pub struct IconUrlBuilder {
    base: Url,
}

impl IconUrlBuilder {
    /// `base` should end with `/`; icons resolve to `<base><icon>.png`.
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL for `icon`, or `None` when the identifier can't form one.
    pub fn url_for(&self, icon: &str) -> Option<Url> {
        if icon.is_empty() || !icon.chars().all(|c| c.is_ascii_alphanumeric()) {
            tracing::debug!("No icon URL for identifier {:?}", icon);
            return None;
        }
        self.base.join(&format!("{}.png", icon)).ok()
    }
}
