//! Search queries against the bug tracker REST API.
//!
//! One blocking GET per query; results are concatenated in query order.
//! A failing query aborts the whole run.

use crate::error::QueryError;
use crate::models::Bug;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

/// Upper bound on a single response body. Searches run with `limit=0`.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
/// A search request: a quicksearch expression, or explicit search params
/// for queries quicksearch cannot express (custom flags, boolean charts).
pub enum Query {
    Quick(String),
    Advanced { params: Vec<(String, String)> },
}

impl Query {
    pub fn quick(q: impl Into<String>) -> Self {
        Query::Quick(q.into())
    }

    /// Query string parameters this query adds to the request.
    pub fn params(&self) -> Vec<(String, String)> {
        match self {
            Query::Quick(q) => vec![("quicksearch".to_string(), q.clone())],
            Query::Advanced { params } => params.clone(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Quick(q) => f.write_str(q),
            Query::Advanced { params } => {
                let joined: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
                f.write_str(&joined.join("&"))
            }
        }
    }
}

/// Source of bug records for one query.
pub trait SearchClient {
    fn search(&self, query: &Query, fields: &[String]) -> Result<Vec<Bug>, QueryError>;
}

#[derive(Deserialize)]
struct SearchResponse {
    bugs: Vec<Bug>,
}

/// `SearchClient` backed by a synchronous `ureq` agent.
pub struct HttpSearchClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpSearchClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            endpoint: endpoint.into(),
        }
    }
}

impl SearchClient for HttpSearchClient {
    fn search(&self, query: &Query, fields: &[String]) -> Result<Vec<Bug>, QueryError> {
        debug!(endpoint = %self.endpoint, %query, "searching");
        let response = self
            .agent
            .get(&self.endpoint)
            .query("include_fields", fields.join(","))
            .query("limit", "0")
            .query_pairs(query.params())
            .call()
            .map_err(|err| match err {
                ureq::Error::StatusCode(status) => QueryError::Status {
                    query: query.to_string(),
                    status,
                },
                other => QueryError::Transport {
                    query: query.to_string(),
                    reason: other.to_string(),
                },
            })?;

        let body = response
            .into_body()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|err| QueryError::Transport {
                query: query.to_string(),
                reason: format!("failed reading response body: {err}"),
            })?;

        parse_search_response(query, &body)
    }
}

fn parse_search_response(query: &Query, body: &str) -> Result<Vec<Bug>, QueryError> {
    let parsed: SearchResponse = serde_json::from_str(body).map_err(|err| QueryError::Decode {
        query: query.to_string(),
        reason: err.to_string(),
    })?;
    Ok(parsed.bugs)
}

/// Run every query and concatenate the results.
///
/// Bugs matching several queries appear once per matching query.
pub fn run_queries<C: SearchClient + ?Sized>(
    client: &C,
    queries: &[Query],
    fields: &[String],
) -> Result<Vec<Bug>, QueryError> {
    let mut bugs = Vec::new();
    for query in queries {
        let found = client.search(query, fields)?;
        info!(%query, count = found.len(), "query returned bugs");
        bugs.extend(found);
    }
    Ok(bugs)
}
