pub mod report_snapshots;
