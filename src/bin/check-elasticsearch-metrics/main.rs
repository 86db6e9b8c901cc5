//! Query elasticsearch and alert when the number of matching documents
//! crosses a threshold

mod args;
mod elastic;

use env_logger::Env;
use log::{debug, error};
use structopt::StructOpt;

use check_elasticsearch_metrics::Status;

use crate::args::Args;

/// Map the reduced value onto a status
///
/// Boundary values breach: a value equal to a threshold alerts.
fn alert_status(value: f64, warning: f64, critical: f64, reverse: bool) -> Status {
    if reverse {
        if value <= critical {
            Status::Critical
        } else if value <= warning {
            Status::Warning
        } else {
            Status::Ok
        }
    } else if value >= critical {
        Status::Critical
    } else if value >= warning {
        Status::Warning
    } else {
        Status::Ok
    }
}

fn init_logging(debug: bool) {
    if debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    }
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(args.debug);
    debug!("args: {:?}", args);

    let response = match elastic::run_query(&args) {
        Ok(response) => response,
        Err(e) => {
            error!("elasticsearch query failed: {}", e);
            println!("[check-elasticsearch-metrics] UNKNOWN: {}", e);
            Status::Unknown.exit();
        }
    };

    let value = elastic::reduce_response(&args, &response);
    debug!("result: {}", value);

    let status = alert_status(value, args.warning, args.critical, args.reverse);
    let direction = if args.reverse { "<=" } else { ">=" };
    println!(
        "[check-elasticsearch-metrics] {}: query {:?} matched {} (warning {} {}, critical {} {})",
        status, args.query, value, direction, args.warning, direction, args.critical
    );
    status.exit();
}
