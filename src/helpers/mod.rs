pub mod config_helper;
pub mod job_helper;
