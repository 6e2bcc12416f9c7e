// Cooperative pause/resume/stop control
//
// The worker blocks on the pause gate before starting each video; it never
// interrupts an in-flight single-video operation. The controller only sets
// and clears flags, it never blocks. One run at a time per control: callers
// must not start a second run while one is active.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct RunControl {
    paused: Mutex<bool>,
    unpaused: Condvar,
    stop: AtomicBool,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        let mut paused = self.paused.lock().unwrap();
        *paused = true;
    }

    pub fn resume(&self) {
        let mut paused = self.paused.lock().unwrap();
        *paused = false;
        self.unpaused.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock().unwrap()
    }

    /// Request a stop. Also wakes a paused worker so it can observe the
    /// stop flag and exit promptly.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        let _paused = self.paused.lock().unwrap();
        self.unpaused.notify_all();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Block until the run is unpaused or a stop is requested.
    /// Called by the worker before each video.
    pub fn wait_if_paused(&self) {
        let mut paused = self.paused.lock().unwrap();
        while *paused && !self.stop.load(Ordering::Relaxed) {
            paused = self.unpaused.wait(paused).unwrap();
        }
    }
}
