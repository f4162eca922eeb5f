use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Finished,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub status: JobStatus,
    pub started_at: Option<Instant>,
    pub ended_at: Option<Instant>,
}

impl Job {
    pub fn new() -> Self {
        Self {
            status: JobStatus::Pending,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn finish(&mut self, status: JobStatus) {
        self.status = status;
        self.ended_at = Some(Instant::now());
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}
