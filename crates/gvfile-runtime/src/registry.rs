//! Descriptor registry
//!
//! Tracks which descriptors are currently owned by a channel. The default
//! waiter uses it to catch ownership bugs early: registering a descriptor
//! twice means two channels think they own it, and unregistering an
//! unknown one means a close/detach ran on a stale handle.

use gvfile_core::kwarn;

use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::sync::{Mutex, MutexGuard};

/// Owner count per descriptor. More than one owner is always a bug.
#[derive(Debug, Default)]
pub struct FdRegistry {
    owners: Mutex<HashMap<RawFd, usize>>,
}

impl FdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RawFd, usize>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.owners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns false (and warns) if `fd` already had an owner.
    pub fn register(&self, fd: RawFd) -> bool {
        let count = {
            let mut owners = self.lock();
            let count = owners.entry(fd).or_insert(0);
            *count += 1;
            *count
        };
        if count > 1 {
            kwarn!("fd {} registered twice ({} owners)", fd, count);
        }
        count == 1
    }

    /// Returns false (and warns) if `fd` was not registered.
    pub fn unregister(&self, fd: RawFd) -> bool {
        let known = {
            let mut owners = self.lock();
            match owners.get_mut(&fd) {
                Some(count) if *count > 1 => {
                    *count -= 1;
                    true
                }
                Some(_) => {
                    owners.remove(&fd);
                    true
                }
                None => false,
            }
        };
        if !known {
            kwarn!("fd {} unregistered but not known", fd);
        }
        known
    }

    pub fn contains(&self, fd: RawFd) -> bool {
        self.lock().contains_key(&fd)
    }

    /// How many channels currently claim `fd`.
    pub fn owners(&self, fd: RawFd) -> usize {
        self.lock().get(&fd).copied().unwrap_or(0)
    }

    /// Number of distinct registered descriptors.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
