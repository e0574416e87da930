// Request/response vocabulary of the list-view engine.

use std::sync::Arc;

/// Where a request lands: business area plus (usually) a program.
/// Grievance tickets may be listed business-area-wide, hence the option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub business_area: String,
    pub program: Option<String>,
}

impl Scope {
    pub fn new(business_area: impl Into<String>, program: Option<String>) -> Self {
        Self {
            business_area: business_area.into(),
            program,
        }
    }
}

/// Pagination and sort inputs, kept apart from filter state: paging
/// through results is not a filter change and must not bump the filter
/// generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Server sort key; `-` prefix means descending.
    pub ordering: Option<String>,
}

impl PageSpec {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            ordering: None,
        }
    }

    /// Query parameters for a fetch. Page and size are always explicit
    /// so the server never surprises us with its own defaults.
    pub fn request_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_owned(), self.page.to_string()),
            ("pageSize".to_owned(), self.page_size.to_string()),
        ];
        if let Some(ordering) = &self.ordering {
            params.push(("ordering".to_owned(), ordering.clone()));
        }
        params
    }

    /// Query parameters for a share link: defaults omitted, page size
    /// left to the web app.
    pub fn link_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if self.page > 1 {
            params.push(("page".to_owned(), self.page.to_string()));
        }
        if let Some(ordering) = &self.ordering {
            params.push(("ordering".to_owned(), ordering.clone()));
        }
        params
    }

    /// Number of pages needed for `total` rows (at least 1).
    pub fn page_count(&self, total: u64) -> u32 {
        if total == 0 {
            return 1;
        }
        let size = u64::from(self.page_size.max(1));
        u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX)
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SIZE)
    }
}

/// Everything one fetch needs: scope, resource, encoded filter pairs,
/// page inputs. The fingerprint is the cache/skip identity — two
/// requests with equal fingerprints would hit the same URL with the
/// same parameters.
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub scope: Scope,
    pub resource: &'static str,
    pub filter_params: Vec<(String, String)>,
    pub page: PageSpec,
    fingerprint: String,
}

impl ListRequest {
    pub fn new(
        scope: Scope,
        resource: &'static str,
        filter_params: Vec<(String, String)>,
        page: PageSpec,
    ) -> Self {
        let mut fingerprint = format!(
            "{}/{}/{resource}",
            scope.business_area,
            scope.program.as_deref().unwrap_or("-"),
        );
        for (key, value) in filter_params.iter().chain(&page.request_params()) {
            fingerprint.push('&');
            fingerprint.push_str(key);
            fingerprint.push('=');
            fingerprint.push_str(value);
        }

        Self {
            scope,
            resource,
            filter_params,
            page,
            fingerprint,
        }
    }

    /// All query parameters, filter pairs first (schema order), then
    /// page parameters.
    pub fn params(&self) -> Vec<(String, String)> {
        self.filter_params
            .iter()
            .cloned()
            .chain(self.page.request_params())
            .collect()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// One page of results as the server returned it.
#[derive(Debug)]
pub struct ListPage<T> {
    pub rows: Vec<Arc<T>>,
    pub total: u64,
}

impl<T> Clone for ListPage<T> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            total: self.total,
        }
    }
}

/// Lifecycle of a view's current fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// No fetch has completed or started yet.
    Idle,
    /// A fetch is in flight; `rows` still hold the previous page.
    Loading,
    Loaded,
    /// The last fetch failed; `rows` still hold the previous page.
    Failed(String),
}

impl Phase {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// What UIs render: the latest page plus where it came from.
///
/// Published on a watch channel; `generation` is the filter generation
/// that produced `rows`, so consumers can correlate what they see with
/// what they applied.
#[derive(Debug)]
pub struct ListState<T> {
    pub phase: Phase,
    pub rows: Vec<Arc<T>>,
    pub total: u64,
    pub page: u32,
    pub generation: u64,
}

impl<T> ListState<T> {
    pub(crate) fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            rows: Vec::new(),
            total: 0,
            page: 1,
            generation: 0,
        }
    }
}

impl<T> Clone for ListState<T> {
    fn clone(&self) -> Self {
        Self {
            phase: self.phase.clone(),
            rows: self.rows.clone(),
            total: self.total,
            page: self.page,
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn request(page: PageSpec) -> ListRequest {
        ListRequest::new(
            Scope::new("kenya", Some("cash-2024".into())),
            "households",
            vec![("search".into(), "foo".into())],
            page,
        )
    }

    #[test]
    fn params_combine_filter_then_page() {
        let req = request(PageSpec {
            page: 2,
            page_size: 50,
            ordering: Some("-created_at".into()),
        });
        assert_eq!(
            req.params(),
            vec![
                ("search".to_owned(), "foo".to_owned()),
                ("page".to_owned(), "2".to_owned()),
                ("pageSize".to_owned(), "50".to_owned()),
                ("ordering".to_owned(), "-created_at".to_owned()),
            ]
        );
    }

    #[test]
    fn fingerprint_is_value_identity() {
        let a = request(PageSpec::new(20));
        let b = request(PageSpec::new(20));
        assert_eq!(a.fingerprint(), b.fingerprint());

        let other_page = request(PageSpec {
            page: 2,
            page_size: 20,
            ordering: None,
        });
        assert_ne!(a.fingerprint(), other_page.fingerprint());

        let other_scope = ListRequest::new(
            Scope::new("kenya", None),
            "households",
            vec![("search".into(), "foo".into())],
            PageSpec::new(20),
        );
        assert_ne!(a.fingerprint(), other_scope.fingerprint());
    }

    #[test]
    fn link_params_omit_defaults() {
        assert!(PageSpec::new(20).link_params().is_empty());
        let spec = PageSpec {
            page: 3,
            page_size: 20,
            ordering: Some("code".into()),
        };
        assert_eq!(
            spec.link_params(),
            vec![
                ("page".to_owned(), "3".to_owned()),
                ("ordering".to_owned(), "code".to_owned()),
            ]
        );
    }

    #[test]
    fn page_count_rounds_up() {
        let spec = PageSpec::new(20);
        assert_eq!(spec.page_count(0), 1);
        assert_eq!(spec.page_count(20), 1);
        assert_eq!(spec.page_count(21), 2);
        assert_eq!(spec.page_count(400), 20);
    }
}
