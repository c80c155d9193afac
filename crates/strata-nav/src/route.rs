#![forbid(unsafe_code)]

//! URL ↔ content-id mapping.
//!
//! The address bar carries the topmost overlay in a single query parameter
//! (`?id=<content id>` by default). Path, fragment and every other query
//! parameter are preserved when the id is inserted or removed. A parameter
//! that is present but empty means "no overlay".

use strata_core::ContentId;
use thiserror::Error;
use url::Url;

/// Route decoding failures.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid location: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("content id is empty")]
    EmptyId,
}

/// Reads and writes the overlay id query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCodec {
    param: String,
}

impl RouteCodec {
    #[must_use]
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }

    #[inline]
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Content id carried by `location`, if any.
    pub fn id_of(&self, location: &str) -> Result<Option<ContentId>, RouteError> {
        let url = Url::parse(location)?;
        Ok(url
            .query_pairs()
            .find(|(name, _)| *name == self.param)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .map(ContentId::from))
    }

    /// `location` with the id parameter set to `id`, replacing any previous
    /// value in place.
    pub fn with_id(&self, location: &str, id: &ContentId) -> Result<String, RouteError> {
        if id.as_str().is_empty() {
            return Err(RouteError::EmptyId);
        }
        let mut url = Url::parse(location)?;
        let mut replaced = false;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter_map(|(name, value)| {
                if name == self.param {
                    if replaced {
                        return None;
                    }
                    replaced = true;
                    return Some((name.into_owned(), id.as_str().to_owned()));
                }
                Some((name.into_owned(), value.into_owned()))
            })
            .collect();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.extend_pairs(pairs.iter());
            if !replaced {
                query.append_pair(&self.param, id.as_str());
            }
        }
        Ok(url.into())
    }

    /// `location` with the id parameter removed. An empty query is dropped
    /// entirely.
    pub fn without_id(&self, location: &str) -> Result<String, RouteError> {
        let mut url = Url::parse(location)?;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| *name != self.param)
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs.iter());
        }
        Ok(url.into())
    }
}

impl Default for RouteCodec {
    fn default() -> Self {
        Self::new(strata_core::config::DEFAULT_QUERY_PARAM)
    }
}
