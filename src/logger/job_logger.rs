use chrono::{DateTime, Utc};
use crate::errors::MonitorResult;
use crate::structs::job_batch::JobBatch;
use crate::structs::job_status::JobStatus;

pub struct JobLogger {}

impl JobLogger {
    pub fn print_jobs(title: &str, jobs: &[JobStatus]) {
        println!("\n{} ({})", title, jobs.len());
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if jobs.is_empty() {
            println!("  nothing to show");
            return;
        }

        for job in jobs {
            println!("{}", Self::format_job_line(job));
        }
    }

    pub fn print_json(jobs: &[JobStatus]) -> MonitorResult<()> {
        println!("{}", serde_json::to_string_pretty(jobs)?);
        Ok(())
    }

    pub fn print_batch(batch: &JobBatch, json: bool) -> MonitorResult<()> {
        if let Some(error) = batch.error() {
            eprintln!("⚠️  Cycle {} failed: {}", batch.cycle, error);
            return Ok(());
        }

        if json {
            println!("{}", serde_json::to_string(batch.jobs())?);
            return Ok(());
        }

        Self::print_jobs(
            &format!("⏳ Waiting for approval, cycle {} at {}", batch.cycle, batch.completed_at.format("%H:%M:%S")),
            batch.jobs(),
        );
        Ok(())
    }

    pub fn format_job_line(job: &JobStatus) -> String {
        let environment = if job.environment.is_empty() { "-" } else { job.environment.as_str() };

        format!(
            "{} {:<28} #{:<6} {:<14} {:<10} {:<24} {:<12} {}",
            Self::status_icon(&job.status),
            truncate(&job.repository, 28),
            job.run_number,
            truncate(&job.status, 14),
            truncate(environment, 10),
            truncate(&job.workflow_name, 24),
            truncate(&job.actor, 12),
            started(job.started_at),
        )
    }

    fn status_icon(status: &str) -> &'static str {
        match status {
            "waiting" => "⏳",
            "queued" | "pending" | "requested" => "🕒",
            "in_progress" => "🔄",
            "success" => "✅",
            "failure" | "startup_failure" | "timed_out" => "❌",
            "cancelled" | "skipped" => "⏹️",
            _ => "•",
        }
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(width.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

fn started(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string())
}
