// Seams between the orchestrator and its collaborators

use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;

use super::command::MuxCommand;
use super::errors::{MuxError, ResolveError, TransferError};
use super::models::{Resource, StreamDescriptor, StreamKind};

/// Key a stream query can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Video height
    Resolution,
    /// Audio bitrate
    Bitrate,
}

/// Predicate over stream descriptors; `None` fields match anything
#[derive(Debug, Clone, Default)]
pub struct StreamFilter {
    pub adaptive: Option<bool>,
    pub kind: Option<StreamKind>,
    /// Resolution label (e.g., "720p")
    pub resolution: Option<String>,
    pub mime_type: Option<String>,
}

impl StreamFilter {
    pub fn matches(&self, stream: &StreamDescriptor) -> bool {
        self.adaptive.map_or(true, |a| stream.is_adaptive() == a)
            && self.kind.map_or(true, |k| stream.kind == k)
            && self
                .resolution
                .as_ref()
                .map_or(true, |r| stream.resolution().as_ref() == Some(r))
            && self
                .mime_type
                .as_ref()
                .map_or(true, |m| stream.mime_type == *m)
    }
}

/// Filter plus optional ordering
#[derive(Debug, Clone, Default)]
pub struct StreamQuery {
    pub filter: StreamFilter,
    pub order_by: Option<SortKey>,
    pub descending: bool,
}

impl StreamQuery {
    pub fn new(filter: StreamFilter) -> Self {
        Self {
            filter,
            order_by: None,
            descending: false,
        }
    }

    pub fn order_by(mut self, key: SortKey) -> Self {
        self.order_by = Some(key);
        self
    }

    pub fn desc(mut self) -> Self {
        self.descending = true;
        self
    }
}

/// Queryable collection of stream descriptors
pub trait StreamCatalog {
    /// All descriptors in enumeration order
    fn descriptors(&self) -> &[StreamDescriptor];

    /// Matching descriptors, ordered when a sort key is given.
    ///
    /// Descriptors that lack the sort key go last in either direction.
    /// Ties keep enumeration order.
    fn query(&self, query: &StreamQuery) -> Vec<&StreamDescriptor> {
        let mut matches: Vec<&StreamDescriptor> = self
            .descriptors()
            .iter()
            .filter(|s| query.filter.matches(s))
            .collect();

        if let Some(key) = query.order_by {
            matches.sort_by(|a, b| {
                compare(sort_value(a, key), sort_value(b, key), query.descending)
            });
        }

        matches
    }
}

fn sort_value(stream: &StreamDescriptor, key: SortKey) -> Option<f64> {
    match key {
        SortKey::Resolution => stream.height.map(f64::from),
        SortKey::Bitrate => stream.abr.map(f64::from),
    }
}

fn compare(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl StreamCatalog for Resource {
    fn descriptors(&self) -> &[StreamDescriptor] {
        &self.streams
    }
}

/// Turns a source URL into a resource with its stream variants
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    /// Name of the resolver (for logging)
    fn name(&self) -> &'static str;

    async fn resolve(&self, url: &str) -> Result<Resource, ResolveError>;
}

/// Persists one stream to a local file, overwriting it
#[async_trait]
pub trait StreamTransfer: Send + Sync {
    /// Returns the number of bytes written
    async fn transfer(&self, stream: &StreamDescriptor, dest: &Path) -> Result<u64, TransferError>;
}

/// Runs an external muxing command to completion
#[async_trait]
pub trait Muxer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn mux(&self, command: &MuxCommand) -> Result<(), MuxError>;
}
