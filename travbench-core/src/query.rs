//! Query workload

use serde::{Deserialize, Serialize};

/// One query of a set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Query text sent to the endpoint
    pub text: String,
    /// Template this query instantiates, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Query {
    /// Query without template information
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            template: None,
        }
    }

    /// Tag the query with its template name
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// A named, ordered collection of queries benchmarked together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySet {
    /// Set name; becomes the record name
    pub name: String,
    /// Queries in execution order; the position is the record id
    pub queries: Vec<Query>,
}

impl QuerySet {
    /// Build a set from plain query texts
    pub fn new<I, S>(name: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            queries: texts.into_iter().map(Query::new).collect(),
        }
    }

    /// Number of queries
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the set holds no queries
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
