// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Periodic autosave.
//!
//! A single deadline acts as the timer; the UI loop polls it. When it fires
//! and the document has unsaved changes, the regions are written on a worker
//! thread and the result comes back over a channel on a later poll.

use super::serialization::{export_json, AutosaveData};
use crate::config::AutosaveConfig;
use crate::error::SaveError;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::{Duration, Instant};

const AUTOSAVE_FILE: &str = "auto_save.json";

/// Result of one background write.
#[derive(Debug)]
pub struct AutosaveOutcome {
    /// Document revision captured in the snapshot.
    pub revision: u64,
    pub result: Result<PathBuf, SaveError>,
}

/// Autosave timer and in-flight write.
pub struct Autosave {
    enabled: bool,
    interval: Duration,
    directory: PathBuf,
    deadline: Option<Instant>,
    path: Option<PathBuf>,
    in_flight: Option<Receiver<AutosaveOutcome>>,
    /// A write for a document that has since been replaced. Its result is
    /// discarded, but no new write starts until it has finished.
    retired: Option<Receiver<AutosaveOutcome>>,
}

impl Autosave {
    pub fn new(config: &AutosaveConfig, now: Instant) -> Self {
        let mut autosave = Self {
            enabled: false,
            interval: config.interval(),
            directory: config.directory.clone(),
            deadline: None,
            path: None,
            in_flight: None,
            retired: None,
        };
        autosave.set_enabled(config.enabled, now);
        autosave
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// When the pending timer fires, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel the pending timer and, when enabling, arm a fresh one.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        self.deadline = None;
        self.enabled = enabled;
        if enabled {
            self.deadline = Some(now + self.interval);
        }
    }

    /// Whether the timer has fired. Firing re-arms it for the next interval.
    pub fn is_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if self.enabled && deadline <= now => {
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Whether a worker, current or retired, may still touch the file.
    pub fn is_writing(&self) -> bool {
        self.in_flight.is_some() || self.retired.is_some()
    }

    /// Forget the previous document's save path and any pending result.
    pub fn forget_document(&mut self) {
        self.path = None;
        if let Some(receiver) = self.in_flight.take() {
            self.retired = Some(receiver);
        }
    }

    /// Where the next snapshot goes.
    pub fn save_path(&mut self) -> PathBuf {
        self.path
            .get_or_insert_with(|| self.directory.join(AUTOSAVE_FILE))
            .clone()
    }

    /// Write `data` on a worker thread.
    pub fn start_write(&mut self, data: AutosaveData, revision: u64) {
        let path = self.save_path();
        let (sender, receiver) = channel();
        self.in_flight = Some(receiver);

        std::thread::spawn(move || {
            let result = write_snapshot(&data, path);
            let _ = sender.send(AutosaveOutcome { revision, result });
        });
    }

    /// The finished write, if the worker has reported back.
    pub fn poll_finished(&mut self) -> Option<AutosaveOutcome> {
        if let Some(retired) = self.retired.as_ref() {
            if !matches!(retired.try_recv(), Err(TryRecvError::Empty)) {
                self.retired = None;
            }
        }

        let receiver = self.in_flight.as_ref()?;
        match receiver.try_recv() {
            Ok(outcome) => {
                self.in_flight = None;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.in_flight = None;
                None
            }
        }
    }
}

fn write_snapshot(data: &AutosaveData, path: PathBuf) -> Result<PathBuf, SaveError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| SaveError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    export_json(data, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::Region;
    use std::path::Path;

    fn config(dir: &Path) -> AutosaveConfig {
        AutosaveConfig {
            enabled: true,
            interval_secs: 30,
            directory: dir.to_path_buf(),
        }
    }

    fn wait_for(autosave: &mut Autosave) -> AutosaveOutcome {
        for _ in 0..500 {
            if let Some(outcome) = autosave.poll_finished() {
                return outcome;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("autosave worker did not finish");
    }

    #[test]
    fn test_timer_fires_once_per_interval() {
        let start = Instant::now();
        let mut autosave = Autosave::new(&config(Path::new("unused")), start);
        assert!(!autosave.is_due(start + Duration::from_secs(29)));
        assert!(autosave.is_due(start + Duration::from_secs(30)));
        assert!(!autosave.is_due(start + Duration::from_secs(31)));
        assert!(autosave.is_due(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_toggling_rearms_single_timer() {
        let start = Instant::now();
        let mut autosave = Autosave::new(&config(Path::new("unused")), start);

        autosave.set_enabled(false, start + Duration::from_secs(10));
        assert_eq!(autosave.deadline(), None);
        assert!(!autosave.is_due(start + Duration::from_secs(100)));

        let rearmed = start + Duration::from_secs(20);
        autosave.set_enabled(true, rearmed);
        autosave.set_enabled(true, rearmed);
        assert_eq!(autosave.deadline(), Some(rearmed + Duration::from_secs(30)));
        assert!(!autosave.is_due(start + Duration::from_secs(30)));
        assert!(autosave.is_due(start + Duration::from_secs(50)));
    }

    #[test]
    fn test_background_write_reports_revision() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let mut autosave = Autosave::new(&config(&target), Instant::now());
        let data = AutosaveData::new(vec![Region::default_numbered(1)], Path::new("w.png"));

        autosave.start_write(data.clone(), 7);
        assert!(autosave.is_writing());
        let outcome = wait_for(&mut autosave);
        assert_eq!(outcome.revision, 7);
        let path = outcome.result.unwrap();
        assert_eq!(path, target.join(AUTOSAVE_FILE));

        let written: AutosaveData =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, data);
        assert!(!autosave.is_writing());
    }

    #[test]
    fn test_forget_document_waits_out_old_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut autosave = Autosave::new(&config(dir.path()), Instant::now());
        autosave.start_write(AutosaveData::default(), 1);
        autosave.forget_document();
        assert!(autosave.is_writing());

        for _ in 0..500 {
            assert!(autosave.poll_finished().is_none());
            if !autosave.is_writing() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!autosave.is_writing());

        let data = AutosaveData::new(vec![Region::default_numbered(1)], Path::new("b.png"));
        autosave.start_write(data, 2);
        assert_eq!(wait_for(&mut autosave).revision, 2);
    }

    #[test]
    fn test_unwritable_directory_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();
        let mut autosave = Autosave::new(&config(&blocker), Instant::now());

        autosave.start_write(AutosaveData::default(), 3);
        let outcome = wait_for(&mut autosave);
        assert_eq!(outcome.revision, 3);
        assert!(matches!(outcome.result, Err(SaveError::Io { .. })));
    }
}
