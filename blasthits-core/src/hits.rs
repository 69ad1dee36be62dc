//! Hit counting over BLAST XML reports
//!
//! A report nests its hit records under one container element
//! (`<Iteration_hits>` in the NCBI BlastOutput schema). Every element child of
//! that container is a hit; whitespace text between records never counts.

use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

use crate::types::HitSummary;

/// Tag name of the hits container in NCBI BLAST XML
pub const HITS_CONTAINER: &str = "Iteration_hits";

#[derive(Debug, Error)]
pub enum HitsError {
    #[error("XML parse error: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("No <{tag}> element in document")]
    ContainerNotFound { tag: String },
}

pub type HitsResult<T> = Result<T, HitsError>;

/// Parse a report into a document tree.
///
/// NCBI reports start with a DOCTYPE naming an external DTD, so DTDs are
/// accepted. External entities are never fetched.
pub fn parse_document(text: &str) -> HitsResult<Document<'_>> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Ok(Document::parse_with_options(text, options)?)
}

/// Count hits with the default container and missing-container policy
pub fn count_hits(xml: &str) -> HitsResult<usize> {
    HitCounter::default().count(xml)
}

/// Counts the records under a hits container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitCounter {
    container: String,
    missing_as_zero: bool,
}

impl Default for HitCounter {
    fn default() -> Self {
        Self {
            container: HITS_CONTAINER.to_string(),
            missing_as_zero: false,
        }
    }
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different container tag
    pub fn with_container<S: Into<String>>(mut self, tag: S) -> Self {
        self.container = tag.into();
        self
    }

    /// Report 0 instead of [`HitsError::ContainerNotFound`] when the document
    /// has no container
    pub fn missing_as_zero(mut self, enabled: bool) -> Self {
        self.missing_as_zero = enabled;
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Number of element children of the first container in document order
    pub fn count(&self, xml: &str) -> HitsResult<usize> {
        let doc = parse_document(xml)?;
        let count = match self.find_container(&doc)? {
            Some(container) => hit_records(container).count(),
            None => 0,
        };

        log::debug!("Counted {} hits under <{}>", count, self.container);
        Ok(count)
    }

    /// Descriptive fields for every hit, in document order
    pub fn summarize(&self, xml: &str) -> HitsResult<Vec<HitSummary>> {
        let doc = parse_document(xml)?;
        let Some(container) = self.find_container(&doc)? else {
            return Ok(Vec::new());
        };

        Ok(hit_records(container)
            .enumerate()
            .map(|(i, hit)| summarize_hit(i + 1, hit))
            .collect())
    }

    fn find_container<'a, 'input>(
        &self,
        doc: &'a Document<'input>,
    ) -> HitsResult<Option<Node<'a, 'input>>> {
        let container = doc
            .descendants()
            .find(|node| node.has_tag_name(self.container.as_str()));

        match container {
            Some(node) => Ok(Some(node)),
            None if self.missing_as_zero => {
                log::debug!("No <{}> element, reporting zero hits", self.container);
                Ok(None)
            }
            None => Err(HitsError::ContainerNotFound {
                tag: self.container.clone(),
            }),
        }
    }
}

fn hit_records<'a, 'input: 'a>(
    container: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    container.children().filter(|node| node.is_element())
}

fn summarize_hit(position: usize, hit: Node<'_, '_>) -> HitSummary {
    HitSummary {
        position,
        num: child_text(hit, "Hit_num").and_then(|v| v.parse().ok()),
        id: child_text(hit, "Hit_id").map(str::to_string),
        accession: child_text(hit, "Hit_accession").map(str::to_string),
        definition: child_text(hit, "Hit_def").map(str::to_string),
        length: child_text(hit, "Hit_len").and_then(|v| v.parse().ok()),
    }
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
