//! Documentation about the scripts contained herein
//!
//! - [check-elasticsearch-metrics](#check-elasticsearch-metrics)
//!
//! # check-elasticsearch-metrics
//!
//! Cross platform, only requires access to an elasticsearch instance.
//!
//! ```plain
//! $ check-elasticsearch-metrics --help
//! check-elasticsearch-metrics 0.1.0
//! Ops Tools <ops-tools@example.com>
//! Query elasticsearch and alert when the number of matching documents crosses a threshold.
//!
//! Counts the documents that match <query> in the date-partitioned indices for
//! the last few days, optionally narrowed down to some buckets of one
//! aggregation, and compares the result against the warning/critical
//! thresholds.
//!
//! USAGE:
//!     check-elasticsearch-metrics [FLAGS] [OPTIONS] --critical <critical> --host <host> --query <query> --seconds <seconds> --warning <warning>
//!
//! FLAGS:
//!         --debug          Print debug messages
//!     -h, --help           Prints help information
//!     -d, --include_day    Include the day in the elasticsearch index (the index pattern's {dd} placeholder decides this,
//!                          the flag is accepted for compatibility)
//!     -r, --reverse        Reverse the thresholds, so amounts at or below the threshold values alert
//!     -V, --version        Prints version information
//!
//! OPTIONS:
//!         --aggregation_field <aggregation_field>          The name of the field to aggregate
//!         --aggregation_name <aggregation_name>            Aggregation name
//!         --aggregation_result_bucket_key <aggregation_result_bucket_key>...
//!             Aggregation bucket key to sum into the result. Accepts a literal key or an integer range like 500..504.
//!             Repeatable
//!         --aggregation_result_type <aggregation_result_type>
//!             What to sum per selected bucket. Choices: count percentage [default: count]
//!
//!         --aggregation_type <aggregation_type>            Aggregation type. Choices: significant_terms
//!     -c, --critical <critical>                            Critical threshold
//!         --host <host>                                    Elasticsearch host
//!     -n, --index_pattern <index_pattern>
//!             The pattern expects months and years and can take a prefix and days, e.g: metrics-{yyyy}.{mm} [default:
//!             {prefix}-{yyyy}.{mm}.{dd}]
//!         --index_prefix <index_prefix>                    Index prefix [default: logstash]
//!     -i, --indices_count <indices_count>                  The number of daily indices to go back through [default: 2]
//!     -p, --port <port>                                    Elasticsearch port [default: 9200]
//!     -q, --query <query>                                  The query to run in elasticsearch
//!     -s, --seconds <seconds>                              Number of seconds from now to check
//!         --timeout <timeout>                              Request timeout in seconds [default: 10]
//!     -w, --warning <warning>                              Warning threshold
//!
//! Exit codes:
//!     0: Everything OK, check passed
//!     1: Warning threshold breached
//!     2: Critical threshold breached
//!     3: Unknown, encountered an error querying elasticsearch
//! ```
