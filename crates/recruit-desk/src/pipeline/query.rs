use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::Application;
use super::store::{ApplicationStore, StoreError};

/// Direction applied to `created_at` when ordering the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[default]
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Reviewer-controlled parameters for the active queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationQuery {
    /// Case-sensitive substring of the applicant-supplied referral code. Empty disables it.
    pub referral_code_filter: String,
    pub sort_order: SortOrder,
    /// Case-insensitive substring of name, email, or role. Empty disables it.
    pub search: String,
}

impl ApplicationQuery {
    pub fn sorted(sort_order: SortOrder) -> Self {
        Self {
            sort_order,
            ..Self::default()
        }
    }

    pub fn with_referral_code(mut self, filter: impl Into<String>) -> Self {
        self.referral_code_filter = filter.into();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    fn matches(&self, application: &Application, needle: Option<&str>) -> bool {
        if !application.is_active() {
            return false;
        }

        if !self.referral_code_filter.is_empty()
            && !application.referral_code.contains(&self.referral_code_filter)
        {
            return false;
        }

        match needle {
            Some(needle) => [&application.name, &application.email, &application.role]
                .iter()
                .any(|field| field.to_lowercase().contains(needle)),
            None => true,
        }
    }
}

/// Result of one queue computation. Recomputed per request rather than kept as shared
/// mutable state.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveQueue {
    pub query: ApplicationQuery,
    pub applications: Vec<Application>,
    pub fetched_at: DateTime<Utc>,
}

impl ActiveQueue {
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

/// Narrow and order a collection to the active applications matching `query`.
///
/// Terminal applications are always dropped. The sort is stable, so applications sharing a
/// `created_at` keep their incoming order in both directions.
pub fn select_active(
    applications: Vec<Application>,
    query: &ApplicationQuery,
) -> Vec<Application> {
    let needle = (!query.search.is_empty()).then(|| query.search.to_lowercase());

    let mut selected: Vec<Application> = applications
        .into_iter()
        .filter(|application| query.matches(application, needle.as_deref()))
        .collect();

    match query.sort_order {
        SortOrder::Ascending => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Descending => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }

    selected
}

/// Builds the reviewer's active queue from the application store.
pub struct ApplicationQueryEngine<S> {
    store: Arc<S>,
}

impl<S> ApplicationQueryEngine<S>
where
    S: ApplicationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn fetch(&self, query: &ApplicationQuery) -> Result<ActiveQueue, QueryError> {
        let applications = self.store.list().await.map_err(|source| {
            warn!(error = %source, "application listing failed");
            QueryError::Fetch(source)
        })?;

        let total = applications.len();
        let applications = select_active(applications, query);
        debug!(
            total,
            active = applications.len(),
            sort = query.sort_order.label(),
            "active queue computed"
        );

        Ok(ActiveQueue {
            query: query.clone(),
            applications,
            fetched_at: Utc::now(),
        })
    }
}

/// Recoverable failure to read the application collection.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("unable to fetch applications: {0}")]
    Fetch(#[source] StoreError),
}
