//! Append-only approval audit log.

mod approval_log;

pub use approval_log::ApprovalLog;
