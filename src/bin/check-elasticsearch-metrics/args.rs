//! Command line parsing

use std::str::FromStr;

use structopt::StructOpt;

/// Query elasticsearch and alert when the number of matching documents
/// crosses a threshold.
///
/// Counts the documents that match <query> in the date-partitioned indices
/// for the last few days, optionally narrowed down to some buckets of one
/// aggregation, and compares the result against the warning/critical
/// thresholds.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-elasticsearch-metrics",
    author,
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Exit codes:
    0: Everything OK, check passed
    1: Warning threshold breached
    2: Critical threshold breached
    3: Unknown, encountered an error querying elasticsearch"
)]
pub(crate) struct Args {
    #[structopt(short = "w", long = "warning", help = "Warning threshold")]
    pub warning: f64,
    #[structopt(short = "c", long = "critical", help = "Critical threshold")]
    pub critical: f64,
    #[structopt(long = "host", help = "Elasticsearch host")]
    pub host: String,
    #[structopt(
        short = "p",
        long = "port",
        default_value = "9200",
        help = "Elasticsearch port"
    )]
    pub port: u16,
    #[structopt(
        short = "s",
        long = "seconds",
        help = "Number of seconds from now to check"
    )]
    pub seconds: i64,
    #[structopt(
        short = "q",
        long = "query",
        help = "The query to run in elasticsearch"
    )]
    pub query: String,
    #[structopt(
        short = "i",
        long = "indices_count",
        default_value = "2",
        help = "The number of daily indices to go back through"
    )]
    pub indices_count: u32,
    #[structopt(
        long = "index_prefix",
        default_value = "logstash",
        help = "Index prefix"
    )]
    pub index_prefix: String,
    #[structopt(
        short = "n",
        long = "index_pattern",
        default_value = "{prefix}-{yyyy}.{mm}.{dd}",
        help = "The pattern expects months and years and can take a prefix and days, \
                e.g: metrics-{yyyy}.{mm}"
    )]
    pub index_pattern: String,
    // The {dd} placeholder in the index pattern is what actually decides
    // whether the day shows up in index names; the flag stays accepted so
    // existing monitoring configs keep working.
    #[structopt(
        short = "d",
        long = "include_day",
        help = "Include the day in the elasticsearch index (the index pattern's {dd} \
                placeholder decides this, the flag is accepted for compatibility)"
    )]
    pub include_day: bool,
    #[structopt(
        short = "r",
        long = "reverse",
        help = "Reverse the thresholds, so amounts at or below the threshold values alert"
    )]
    pub reverse: bool,
    #[structopt(long = "aggregation_name", help = "Aggregation name")]
    pub aggregation_name: Option<String>,
    #[structopt(
        long = "aggregation_type",
        help = "Aggregation type. Choices: significant_terms"
    )]
    pub aggregation_type: Option<AggregationType>,
    #[structopt(
        long = "aggregation_field",
        help = "The name of the field to aggregate"
    )]
    pub aggregation_field: Option<String>,
    #[structopt(
        long = "aggregation_result_bucket_key",
        help = "Aggregation bucket key to sum into the result. Accepts a literal key \
                or an integer range like 500..504. Repeatable"
    )]
    pub aggregation_result_bucket_key: Vec<BucketKey>,
    #[structopt(
        long = "aggregation_result_type",
        default_value = "count",
        help = "What to sum per selected bucket. Choices: count percentage"
    )]
    pub aggregation_result_type: ResultType,
    #[structopt(
        long = "timeout",
        default_value = "10",
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,
    #[structopt(long = "debug", help = "Print debug messages")]
    pub debug: bool,
}

impl Args {
    /// An aggregation is attached only when all three of name/type/field
    /// were given
    pub fn need_aggregate(&self) -> bool {
        self.aggregation_name.is_some()
            && self.aggregation_type.is_some()
            && self.aggregation_field.is_some()
    }

    /// The flat list of bucket keys to sum, with ranges expanded
    pub fn bucket_keys(&self) -> Vec<String> {
        flatten_bucket_keys(&self.aggregation_result_bucket_key)
    }
}

/// The aggregation types this check knows how to attach to a query
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum AggregationType {
    SignificantTerms,
}

impl AggregationType {
    /// The name elasticsearch uses for this aggregation in a request body
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationType::SignificantTerms => "significant_terms",
        }
    }
}

impl FromStr for AggregationType {
    type Err = String;

    fn from_str(s: &str) -> Result<AggregationType, String> {
        match s {
            "significant_terms" => Ok(AggregationType::SignificantTerms),
            _ => Err(format!(
                "unknown aggregation type {:?}, choices: significant_terms",
                s
            )),
        }
    }
}

/// What each selected bucket contributes to the reduced value
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ResultType {
    Count,
    Percentage,
}

impl FromStr for ResultType {
    type Err = String;

    fn from_str(s: &str) -> Result<ResultType, String> {
        match s {
            "count" => Ok(ResultType::Count),
            "percentage" => Ok(ResultType::Percentage),
            _ => Err(format!(
                "unknown result type {:?}, choices: count percentage",
                s
            )),
        }
    }
}

/// One `--aggregation_result_bucket_key` value: a literal key, or an
/// inclusive integer range like `500..504`
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum BucketKey {
    Literal(String),
    Range(i64, i64),
}

impl FromStr for BucketKey {
    type Err = String;

    fn from_str(s: &str) -> Result<BucketKey, String> {
        // Only `..` past the first character makes a range, so keys that
        // merely start with dots stay literal.
        match s.find("..") {
            Some(idx) if idx > 0 => {
                let start = s[..idx]
                    .parse()
                    .map_err(|_| format!("invalid bucket key range {:?}", s))?;
                let finish = s[idx + 2..]
                    .parse()
                    .map_err(|_| format!("invalid bucket key range {:?}", s))?;
                Ok(BucketKey::Range(start, finish))
            }
            _ => Ok(BucketKey::Literal(s.to_owned())),
        }
    }
}

/// Expand the parsed bucket keys into the flat list of keys to sum
///
/// Literal keys keep their relative order; every range is enumerated after
/// them, ranges in their original relative order.
pub(crate) fn flatten_bucket_keys(keys: &[BucketKey]) -> Vec<String> {
    let mut flat: Vec<String> = keys
        .iter()
        .filter_map(|key| match key {
            BucketKey::Literal(s) => Some(s.clone()),
            BucketKey::Range(..) => None,
        })
        .collect();
    for key in keys {
        if let BucketKey::Range(start, finish) = *key {
            flat.extend((start..=finish).map(|n| n.to_string()));
        }
    }
    flat
}

#[cfg(test)]
mod test {
    use structopt::StructOpt;

    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "check-elasticsearch-metrics",
            "--critical",
            "10",
            "--warning",
            "5",
            "--host",
            "test.me",
            "--seconds",
            "600",
            "--query",
            "test",
        ]
    }

    fn build_args(extra: Vec<&str>) -> Args {
        let mut argv = base_args();
        argv.extend(extra);
        Args::from_iter(argv.into_iter())
    }

    #[test]
    fn defaults() {
        let args = build_args(vec![]);
        assert_eq!(args.critical, 10.0);
        assert_eq!(args.warning, 5.0);
        assert_eq!(args.host, "test.me");
        assert_eq!(args.port, 9200);
        assert_eq!(args.seconds, 600);
        assert_eq!(args.indices_count, 2);
        assert_eq!(args.index_prefix, "logstash");
        assert_eq!(args.index_pattern, "{prefix}-{yyyy}.{mm}.{dd}");
        assert_eq!(args.aggregation_result_type, ResultType::Count);
        assert_eq!(args.timeout, 10);
        assert!(!args.reverse);
        assert!(!args.debug);
        assert!(!args.need_aggregate());
    }

    #[test]
    fn missing_required_flags_fail() {
        let argv = vec!["check-elasticsearch-metrics", "--critical", "10"];
        assert!(Args::from_iter_safe(argv.into_iter()).is_err());
    }

    #[test]
    fn aggregation_flags() {
        let args = build_args(vec![
            "--aggregation_name",
            "elastic-plugin-tests",
            "--aggregation_type",
            "significant_terms",
            "--aggregation_field",
            "response.keyword",
            "--aggregation_result_type",
            "percentage",
        ]);
        assert!(args.need_aggregate());
        assert_eq!(
            args.aggregation_type,
            Some(AggregationType::SignificantTerms)
        );
        assert_eq!(args.aggregation_result_type, ResultType::Percentage);

        // one flag short of an aggregation
        let args = build_args(vec!["--aggregation_name", "elastic-plugin-tests"]);
        assert!(!args.need_aggregate());
    }

    #[test]
    fn bad_enum_choices_fail() {
        let mut argv = base_args();
        argv.extend(vec!["--aggregation_type", "terms"]);
        assert!(Args::from_iter_safe(argv.into_iter()).is_err());

        let mut argv = base_args();
        argv.extend(vec!["--aggregation_result_type", "ratio"]);
        assert!(Args::from_iter_safe(argv.into_iter()).is_err());
    }

    #[test]
    fn bucket_key_range_is_expanded() {
        let args = build_args(vec!["--aggregation_result_bucket_key", "500..504"]);
        assert_eq!(args.bucket_keys(), ["500", "501", "502", "503", "504"]);
    }

    #[test]
    fn bucket_key_single_item_passes_through() {
        let args = build_args(vec!["--aggregation_result_bucket_key", "500"]);
        assert_eq!(args.bucket_keys(), ["500"]);
    }

    #[test]
    fn bucket_key_mix_of_range_and_single_item() {
        let args = build_args(vec![
            "--aggregation_result_bucket_key",
            "200",
            "--aggregation_result_bucket_key",
            "500..504",
        ]);
        assert_eq!(
            args.bucket_keys(),
            ["200", "500", "501", "502", "503", "504"]
        );
    }

    #[test]
    fn ranges_are_appended_after_literals() {
        let args = build_args(vec![
            "--aggregation_result_bucket_key",
            "1..2",
            "--aggregation_result_bucket_key",
            "a",
            "--aggregation_result_bucket_key",
            "3..4",
        ]);
        assert_eq!(args.bucket_keys(), ["a", "1", "2", "3", "4"]);
    }

    #[test]
    fn leading_dots_are_a_literal_key() {
        assert_eq!(
            "..500".parse::<BucketKey>().unwrap(),
            BucketKey::Literal("..500".into())
        );
        assert_eq!(
            "WARN".parse::<BucketKey>().unwrap(),
            BucketKey::Literal("WARN".into())
        );
        assert_eq!("500..504".parse::<BucketKey>().unwrap(), BucketKey::Range(500, 504));
    }

    #[test]
    fn malformed_ranges_fail() {
        assert!("5..".parse::<BucketKey>().is_err());
        assert!("a..b".parse::<BucketKey>().is_err());
        assert!("1..2..3".parse::<BucketKey>().is_err());

        let mut argv = base_args();
        argv.extend(vec!["--aggregation_result_bucket_key", "5.."]);
        assert!(Args::from_iter_safe(argv.into_iter()).is_err());
    }

    #[test]
    fn empty_range_expands_to_nothing() {
        let args = build_args(vec!["--aggregation_result_bucket_key", "5..4"]);
        assert!(args.bucket_keys().is_empty());
    }
}
