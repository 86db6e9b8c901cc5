//! Talk to elasticsearch
//!
//! This module builds the date-partitioned index names and the search body,
//! runs the one query the check makes, and reduces the response to the
//! number that the thresholds are compared against.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use log::debug;
use reqwest::Error as ReqwestError;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::args::{Args, ResultType};

/// The elasticsearch indices to search: one per calendar day ending today,
/// newest first, joined with commas
pub(crate) fn build_indices(
    indices_count: u32,
    index_pattern: &str,
    index_prefix: &str,
) -> String {
    indices_ending_on(
        Local::now().date_naive(),
        indices_count,
        index_pattern,
        index_prefix,
    )
}

fn indices_ending_on(
    today: NaiveDate,
    indices_count: u32,
    index_pattern: &str,
    index_prefix: &str,
) -> String {
    let mut indices = Vec::with_capacity(indices_count as usize);
    for i in 0..indices_count {
        let day = today - chrono::Duration::days(i64::from(i));
        indices.push(
            index_pattern
                .replace("{prefix}", index_prefix)
                .replace("{yyyy}", &day.year().to_string())
                .replace("{mm}", &format!("{:02}", day.month()))
                .replace("{dd}", &format!("{:02}", day.day())),
        );
    }
    indices.join(",")
}

/// The search body: the query string with wildcard analysis, intersected
/// with a relative time-range filter, plus at most one bucketed aggregation
pub(crate) fn build_search_body(args: &Args) -> Value {
    let mut body = json!({
        "query": {
            "bool": {
                "must": [
                    { "query_string": { "query": args.query, "analyze_wildcard": true } },
                    { "range": { "@timestamp": { "gte": format!("now-{}s", args.seconds) } } }
                ]
            }
        }
    });

    if let (Some(name), Some(kind), Some(field)) = (
        &args.aggregation_name,
        args.aggregation_type,
        &args.aggregation_field,
    ) {
        body["aggs"] = json!({ (name.as_str()): { (kind.as_str()): { "field": field } } });
    }

    body
}

/// Ways that talking to elasticsearch can fail
///
/// They all end up as `UNKNOWN`; the distinction is for the log line.
#[derive(Debug)]
pub(crate) enum EsError {
    Http(ReqwestError),
    Api(String),
    Json(String),
}

impl From<ReqwestError> for EsError {
    fn from(e: ReqwestError) -> EsError {
        EsError::Http(e)
    }
}

impl fmt::Display for EsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            EsError::Http(ref e) => e.fmt(f),
            EsError::Api(ref msg) => write!(f, "{}", msg),
            EsError::Json(ref msg) => write!(f, "{}", msg),
        }
    }
}

/// The parts of a search response that this check reads
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub hits: Hits,
    #[serde(default)]
    pub aggregations: HashMap<String, Aggregation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hits {
    pub total: HitTotal,
}

/// Elasticsearch 7 wraps the hit total in an object, earlier versions
/// return a bare integer
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum HitTotal {
    Bare(u64),
    Tracked { value: u64 },
}

impl HitTotal {
    pub fn value(&self) -> u64 {
        match *self {
            HitTotal::Bare(n) | HitTotal::Tracked { value: n } => n,
        }
    }
}

/// One bucketed aggregation from the response
#[derive(Debug, Deserialize)]
pub(crate) struct Aggregation {
    #[serde(default)]
    pub doc_count: u64,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub(crate) struct Bucket {
    #[serde(deserialize_with = "key_as_string")]
    pub key: String,
    pub doc_count: u64,
}

// Buckets over numeric fields come back with number keys, normalize them to
// the strings the --aggregation_result_bucket_key values use.
fn key_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "unsupported bucket key: {}",
            other
        ))),
    }
}

/// Run the check's one query against elasticsearch
///
/// Failing to reach the cluster, a non-success response, and an undecodable
/// body are all `EsError`s for the caller to map to `UNKNOWN`.
pub(crate) fn run_query(args: &Args) -> Result<SearchResponse, EsError> {
    let index = build_indices(args.indices_count, &args.index_pattern, &args.index_prefix);
    let url = format!("http://{}:{}/{}/_search", args.host, args.port, index);
    let body = build_search_body(args);
    debug!("POST {} body: {}", url, body);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;
    let mut response = client.post(&url).json(&body).send()?;
    let text = response.text()?;
    if !response.status().is_success() {
        return Err(EsError::Api(format!(
            "elasticsearch returned {} for {}: {}",
            response.status(),
            url,
            text
        )));
    }
    serde_json::from_str(&text).map_err(|e| {
        EsError::Json(format!(
            "elasticsearch returned unexpected json ({}): {}",
            e, text
        ))
    })
}

/// Percent of `whole` that `part` makes up, rounded to two decimals
///
/// An aggregation that matched no documents has a percentage of 0.
pub(crate) fn calc_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let percent = part as f64 * 100.0 / whole as f64;
    (percent * 100.0).round() / 100.0
}

/// Reduce a search response to the number the thresholds compare against
///
/// Without an aggregation this is the total hit count. With one, it is the
/// sum over the configured bucket keys of each bucket's count or percentage;
/// a key with no bucket in the response contributes 0.
pub(crate) fn reduce_response(args: &Args, response: &SearchResponse) -> f64 {
    if !args.need_aggregate() {
        return response.hits.total.value() as f64;
    }

    let aggregation = match args
        .aggregation_name
        .as_ref()
        .and_then(|name| response.aggregations.get(name))
    {
        Some(aggregation) => aggregation,
        None => return 0.0,
    };

    let mut result = 0.0;
    for key in args.bucket_keys() {
        if let Some(bucket) = aggregation.buckets.iter().find(|b| b.key == key) {
            result += match args.aggregation_result_type {
                ResultType::Count => bucket.doc_count as f64,
                ResultType::Percentage => calc_percent(bucket.doc_count, aggregation.doc_count),
            };
        }
    }
    result
}
