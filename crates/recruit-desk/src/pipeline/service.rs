use std::sync::Arc;

use super::export::{CsvExportSink, ExportSink};
use super::query::{ApplicationQuery, ApplicationQueryEngine, SortOrder};
use super::session::ReviewSession;
use super::store::{ApplicationStore, TeamStore};
use super::team::TeamService;
use super::workflow::ApplicationWorkflow;

/// Facade composing the query engine, review workflow, team flow, and export sink over one
/// pair of stores.
pub struct ReviewPipeline<S, T> {
    queries: Arc<ApplicationQueryEngine<S>>,
    workflow: Arc<ApplicationWorkflow<S, T>>,
    team: TeamService<T>,
    export: Box<dyn ExportSink>,
    default_sort: SortOrder,
}

impl<S, T> ReviewPipeline<S, T>
where
    S: ApplicationStore + 'static,
    T: TeamStore + 'static,
{
    pub fn new(applications: Arc<S>, team: Arc<T>) -> Self {
        Self {
            queries: Arc::new(ApplicationQueryEngine::new(applications.clone())),
            workflow: Arc::new(ApplicationWorkflow::new(applications, team.clone())),
            team: TeamService::new(team),
            export: Box::new(CsvExportSink::default()),
            default_sort: SortOrder::default(),
        }
    }

    pub fn with_default_sort(mut self, sort_order: SortOrder) -> Self {
        self.default_sort = sort_order;
        self
    }

    pub fn with_export_sink(mut self, sink: impl ExportSink + 'static) -> Self {
        self.export = Box::new(sink);
        self
    }

    pub fn queries(&self) -> &ApplicationQueryEngine<S> {
        &self.queries
    }

    pub fn workflow(&self) -> &ApplicationWorkflow<S, T> {
        &self.workflow
    }

    pub fn team(&self) -> &TeamService<T> {
        &self.team
    }

    pub fn export_sink(&self) -> &dyn ExportSink {
        self.export.as_ref()
    }

    /// Query with every filter off and the configured default order.
    pub fn default_query(&self) -> ApplicationQuery {
        ApplicationQuery::sorted(self.default_sort)
    }

    /// Open a reviewer session sharing this pipeline's engine and workflow.
    pub fn session(&self) -> ReviewSession<S, T> {
        ReviewSession::new(self.queries.clone(), self.workflow.clone())
    }
}
