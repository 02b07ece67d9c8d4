pub mod cache_entry;
pub mod cache_stats;
pub mod cli;
pub mod config;
pub mod job_batch;
pub mod job_status;
pub mod page;
pub mod repo_stats;
pub mod repository;
pub mod scan_progress;
pub mod scan_report;
pub mod ttl_cache;
pub mod workflow;
