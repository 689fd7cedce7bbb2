use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[derive(Debug, Clone)]
pub struct StageStats {
    pub stage: String,
    pub stage_elapsed: Duration,
    pub total_elapsed: Duration,
    pub memory_usage_mb: Option<u64>,
    pub peak_memory_mb: Option<u64>,
}

/// Per-stage timing for a flow run, plus process memory when built with `cli`.
pub struct StageMonitor {
    enabled: bool,
    start_time: Instant,
    stage_start: Instant,
    #[cfg(feature = "cli")]
    process: Option<ProcessSampler>,
}

#[cfg(feature = "cli")]
struct ProcessSampler {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl ProcessSampler {
    fn new() -> Option<Self> {
        let pid = sysinfo::get_current_pid().ok()?;
        Some(Self {
            system: System::new(),
            pid,
            peak_memory_mb: 0,
        })
    }

    fn sample(&mut self) -> Option<(u64, u64)> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let memory_mb = self.system.process(self.pid)?.memory() / 1024 / 1024;
        self.peak_memory_mb = self.peak_memory_mb.max(memory_mb);
        Some((memory_mb, self.peak_memory_mb))
    }
}

impl StageMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            start_time: now,
            stage_start: now,
            #[cfg(feature = "cli")]
            process: if enabled {
                ProcessSampler::new()
            } else {
                None
            },
        }
    }

    /// Closes the current stage and starts timing the next one.
    pub fn finish_stage(&mut self, stage: &str) -> Option<StageStats> {
        let now = Instant::now();
        let stage_elapsed = now.duration_since(self.stage_start);
        self.stage_start = now;

        if !self.enabled {
            return None;
        }

        let (memory_usage_mb, peak_memory_mb) = self.sample_memory();
        let stats = StageStats {
            stage: stage.to_string(),
            stage_elapsed,
            total_elapsed: now.duration_since(self.start_time),
            memory_usage_mb,
            peak_memory_mb,
        };

        match (stats.memory_usage_mb, stats.peak_memory_mb) {
            (Some(mem), Some(peak)) => tracing::info!(
                "📊 {} took {:?} (total {:?}), memory {}MB, peak {}MB",
                stats.stage,
                stats.stage_elapsed,
                stats.total_elapsed,
                mem,
                peak
            ),
            _ => tracing::info!(
                "📊 {} took {:?} (total {:?})",
                stats.stage,
                stats.stage_elapsed,
                stats.total_elapsed
            ),
        }

        Some(stats)
    }

    pub fn log_final_stats(&self) {
        if self.enabled {
            tracing::info!("📊 Flow finished in {:?}", self.start_time.elapsed());
        }
    }

    #[cfg(feature = "cli")]
    fn sample_memory(&mut self) -> (Option<u64>, Option<u64>) {
        self.process
            .as_mut()
            .and_then(|p| p.sample())
            .map(|(mem, peak)| (Some(mem), Some(peak)))
            .unwrap_or((None, None))
    }

    #[cfg(not(feature = "cli"))]
    fn sample_memory(&mut self) -> (Option<u64>, Option<u64>) {
        (None, None)
    }
}

impl Default for StageMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
