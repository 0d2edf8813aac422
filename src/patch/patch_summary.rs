use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PatchSummary {
    pub applied: usize,
    pub elapsed: Duration,
}
