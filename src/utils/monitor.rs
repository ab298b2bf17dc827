use std::sync::Mutex;
use std::time::Instant;
use sysinfo::{Pid, RefreshKind, System};

/// Optional run diagnostics: per-stage wall time and process memory.
pub struct RunMonitor {
    enabled: bool,
    start: Instant,
    stage_start: Mutex<Instant>,
    system: Mutex<System>,
    pid: Option<Pid>,
    peak_memory_mb: Mutex<u64>,
}

impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());
        system.refresh_all();

        let now = Instant::now();
        Self {
            enabled,
            start: now,
            stage_start: Mutex::new(now),
            system: Mutex::new(system),
            pid: sysinfo::get_current_pid().ok(),
            peak_memory_mb: Mutex::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Log how long the stage that just finished took, plus current memory.
    pub fn stage_done(&self, stage: &str) {
        if !self.enabled {
            return;
        }

        let elapsed = {
            let Ok(mut stage_start) = self.stage_start.lock() else {
                return;
            };
            let elapsed = stage_start.elapsed();
            *stage_start = Instant::now();
            elapsed
        };

        match self.current_memory_mb() {
            Some(memory_mb) => tracing::info!(
                "stage '{}' done in {:?}, memory {}MB",
                stage,
                elapsed,
                memory_mb
            ),
            None => tracing::info!("stage '{}' done in {:?}", stage, elapsed),
        }
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self.peak_memory_mb.lock().map(|p| *p).unwrap_or(0);
        tracing::info!(
            "run finished in {:?}, peak memory {}MB",
            self.start.elapsed(),
            peak
        );
    }

    fn current_memory_mb(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_all();
        let process = system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut peak = self.peak_memory_mb.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }

        Some(memory_mb)
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
