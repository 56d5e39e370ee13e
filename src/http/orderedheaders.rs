use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::str::FromStr;

/// A header map that strictly preserves insertion order.
///
/// Header order is part of the fingerprint being impersonated, so the
/// request path never hands headers to a structure that would reorder
/// them.
#[derive(Debug, Clone, Default)]
pub struct OrderedHeaderMap {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl OrderedHeaderMap {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        let name_header =
            HeaderName::from_str(name).map_err(|_| NetError::InvalidHeader(name.to_string()))?;
        let value_header =
            HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader(name.to_string()))?;

        // Update in place if the name exists, else append. HeaderName is
        // already lowercase so simple equality is a case-insensitive match.
        if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| *n == name_header) {
            *v = value_header;
        } else {
            self.headers.push((name_header, value_header));
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) {
        if let Ok(target) = HeaderName::from_str(name) {
            self.headers.retain(|(n, _)| *n != target);
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        if let Ok(target) = HeaderName::from_str(name) {
            self.headers
                .iter()
                .find(|(n, _)| *n == target)
                .map(|(_, v)| v)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }

    /// Rearrange entries to follow `order`.
    ///
    /// Names in `order` come first, in that order; entries not named by
    /// `order` keep their relative insertion order and are appended at the
    /// end. Order entries with no matching header are ignored.
    pub fn apply_order(&mut self, order: &[String]) {
        if order.is_empty() {
            return;
        }

        let mut remaining = std::mem::take(&mut self.headers);
        let mut arranged = Vec::with_capacity(remaining.len());

        for name in order {
            if let Ok(target) = HeaderName::from_str(name) {
                if let Some(idx) = remaining.iter().position(|(n, _)| *n == target) {
                    arranged.push(remaining.remove(idx));
                }
            }
        }

        arranged.extend(remaining);
        self.headers = arranged;
    }

    /// Consumes the map and returns a standard http::HeaderMap.
    /// Note: http::HeaderMap preserves insertion order.
    pub fn to_header_map(self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            map.append(name, value);
        }
        map
    }
}
