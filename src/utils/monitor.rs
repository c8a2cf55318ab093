#[cfg(feature = "cli")]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
    pub imports_completed: usize,
}

/// 批次匯入期間的資源與吞吐量監控
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory: AtomicUsize,
    imports_completed: AtomicUsize,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());
        if enabled {
            system.refresh_all();
        }

        let pid = sysinfo::get_current_pid().ok();
        if enabled && pid.is_none() {
            tracing::warn!("🔶 Could not resolve current PID; process stats disabled");
        }

        Self {
            system: Mutex::new(system),
            pid,
            start_time: Instant::now(),
            peak_memory: AtomicUsize::new(0),
            imports_completed: AtomicUsize::new(0),
            enabled,
        }
    }

    pub fn record_imports(&self, count: usize) {
        self.imports_completed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_all();

        let process = system.process(self.pid?)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let peak = self
            .peak_memory
            .fetch_max(memory_mb as usize, Ordering::Relaxed)
            .max(memory_mb as usize);

        Some(SystemStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: peak as u64,
            elapsed_time: self.start_time.elapsed(),
            imports_completed: self.imports_completed.load(Ordering::Relaxed),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Imports: {}, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.imports_completed,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            let seconds = stats.elapsed_time.as_secs_f64();
            let rate = if seconds > 0.0 {
                stats.imports_completed as f64 / seconds
            } else {
                0.0
            };
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB, {:.2} imports/s",
                stats.elapsed_time,
                stats.peak_memory_mb,
                rate
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置時的空實作
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn record_imports(&self, _count: usize) {}

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
