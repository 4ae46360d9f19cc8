use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Asia/Jakarta is UTC+07:00 all year.
pub const JAKARTA_UTC_OFFSET_SECS: i32 = 7 * 60 * 60;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub fn jakarta_offset() -> FixedOffset {
    FixedOffset::east_opt(JAKARTA_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&jakarta_offset())
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// `{database}_{po}_{timestamp}`; unique unless the same PO is submitted twice
/// within one second.
pub fn build_folder_name(database: &str, po_number: &str, timestamp: &str) -> String {
    format!("{database}_{po_number}_{timestamp}")
}
