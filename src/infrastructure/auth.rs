use crate::domain::drawing::KeyValueStorage;
use crate::domain::logging::LogComponent;
use crate::infrastructure::storage::BrowserStorage;
use crate::log_debug;

/// Supplies the bearer token for outgoing requests. Queried once per request.
pub trait TokenProvider {
    fn token(&self) -> Option<String>;
}

/// One place a token may be found.
pub trait TokenSource {
    fn name(&self) -> &'static str;
    fn read(&self) -> Option<String>;
}

/// Consults its sources in order and returns the first non-blank token.
#[derive(Default)]
pub struct LayeredTokenProvider {
    sources: Vec<Box<dyn TokenSource>>,
}

impl LayeredTokenProvider {
    pub fn new(sources: Vec<Box<dyn TokenSource>>) -> Self {
        Self { sources }
    }

    /// URL parameter, then session storage, then local storage.
    pub fn browser(param: &str, storage_key: &str) -> Self {
        Self::new(vec![
            Box::new(QueryParamSource::new(param)),
            Box::new(StorageTokenSource::new("session", Box::new(BrowserStorage::session()), storage_key)),
            Box::new(StorageTokenSource::new("local", Box::new(BrowserStorage::local()), storage_key)),
        ])
    }

    pub fn with_source(mut self, source: Box<dyn TokenSource>) -> Self {
        self.sources.push(source);
        self
    }
}

impl TokenProvider for LayeredTokenProvider {
    fn token(&self) -> Option<String> {
        self.sources.iter().find_map(|source| {
            let token = source.read()?.trim().to_string();
            if token.is_empty() {
                return None;
            }
            log_debug!(LogComponent::Infrastructure("Auth"), "token taken from {}", source.name());
            Some(token)
        })
    }
}

/// Token passed inline as `?<param>=...` on the page URL.
pub struct QueryParamSource {
    param: String,
}

impl QueryParamSource {
    pub fn new(param: &str) -> Self {
        Self { param: param.to_string() }
    }
}

impl TokenSource for QueryParamSource {
    fn name(&self) -> &'static str {
        "query"
    }

    fn read(&self) -> Option<String> {
        let search = web_sys::window()?.location().search().ok()?;
        web_sys::UrlSearchParams::new_with_str(&search).ok()?.get(&self.param)
    }
}

/// Token stored under a key in a key-value store.
pub struct StorageTokenSource {
    name: &'static str,
    storage: Box<dyn KeyValueStorage>,
    key: String,
}

impl StorageTokenSource {
    pub fn new(name: &'static str, storage: Box<dyn KeyValueStorage>, key: &str) -> Self {
        Self { name, storage, key: key.to_string() }
    }
}

impl TokenSource for StorageTokenSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn read(&self) -> Option<String> {
        self.storage.get(&self.key).ok().flatten()
    }
}

/// Fixed token, for hosts that hand one over directly.
pub struct StaticTokenSource(pub Option<String>);

impl TokenSource for StaticTokenSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn read(&self) -> Option<String> {
        self.0.clone()
    }
}
