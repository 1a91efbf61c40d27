//! Human-facing record numbering

use snowflaked::sync::Generator;

/// Issues display numbers for members and borrowing records.
///
/// The numbers are opaque identifiers printed on membership cards and
/// receipts; the store key stays the integer primary key. Implementations
/// must never hand out the same number twice, even across restarts.
pub trait SequenceGenerator: Send + Sync {
    /// Next member number, e.g. `MBR7149083121512448`
    fn member_number(&self) -> String;
    /// Next borrowing record number, e.g. `BRW7149083121512449`
    fn record_number(&self) -> String;
}

/// Snowflake-backed generator, safe to share across workers
pub struct SnowflakeSequencer {
    members: Generator,
    records: Generator,
}

impl SnowflakeSequencer {
    /// `instance` distinguishes concurrently running servers (0..=1023)
    pub fn new(instance: u16) -> Self {
        Self {
            members: Generator::new(instance),
            records: Generator::new(instance),
        }
    }
}

impl Default for SnowflakeSequencer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SequenceGenerator for SnowflakeSequencer {
    fn member_number(&self) -> String {
        format!("MBR{}", self.members.generate::<u64>())
    }

    fn record_number(&self) -> String {
        format!("BRW{}", self.records.generate::<u64>())
    }
}
