use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    notice: Option<Notice>,
}

/// Holds at most one transient message. Showing a new one replaces the
/// old one and restarts the dismissal timer.
pub struct NoticeBoard {
    slot: Arc<Mutex<Slot>>,
    timer: Option<JoinHandle<()>>,
    delay: Duration,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl NoticeBoard {
    pub fn new(delay: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            timer: None,
            delay,
        }
    }

    pub fn show(&mut self, level: NoticeLevel, text: impl Into<String>) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.notice = Some(Notice {
                level,
                text: text.into(),
            });
            slot.generation
        };

        // Without a runtime the notice simply stays until replaced.
        if tokio::runtime::Handle::try_current().is_ok() {
            let slot = Arc::clone(&self.slot);
            let delay = self.delay;
            self.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let mut slot = lock(&slot);
                if slot.generation == generation {
                    slot.notice = None;
                }
            }));
        }
    }

    pub fn current(&self) -> Option<Notice> {
        lock(&self.slot).notice.clone()
    }

    pub fn dismiss(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        lock(&self.slot).notice = None;
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
