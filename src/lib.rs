//! Helpers for writing Icinga/Nagios check plugins
//!
//! The interesting type in here is `Status`: the four states that a
//! monitoring host understands, with their conventional process exit codes.
//! Check scripts compute a `Status` and finish with `Status::exit()`.
//!
//! The checks that ship with this crate are documented in the
//! [scripts](scripts/index.html) module.

use std::fmt;
use std::process;
use std::str::FromStr;

pub mod scripts;

/// The statuses that nagios-compatible monitoring hosts understand
///
/// Ordered by severity, so several results can be folded into the worst one
/// with `std::cmp::max`.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// The process exit code that the monitoring host maps to this status
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    /// End the process, reporting this status to the monitoring host
    pub fn exit(self) -> ! {
        process::exit(self.code())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Status, String> {
        match s {
            "ok" => Ok(Status::Ok),
            "warn" | "warning" => Ok(Status::Warning),
            "critical" => Ok(Status::Critical),
            "unknown" => Ok(Status::Unknown),
            _ => Err(format!(
                "unexpected status {:?}, expected one of ok/warning/critical/unknown",
                s
            )),
        }
    }
}
