pub mod job_logger;
pub mod progress_spinner;
