//! Session state shared by the maze builder and the explorer

use std::sync::atomic::{AtomicU8, Ordering};

/// What the session is doing right now
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Generating = 1,
    /// The world connection is gone; nothing may act on it anymore
    Closed = 2,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Idle,
            1 => SessionState::Generating,
            _ => SessionState::Closed,
        }
    }
}

/// One bot session
///
/// Guards against overlapping maze generation and carries the termination
/// signal for the exploration loop.
#[derive(Debug)]
pub struct Session {
    state: AtomicU8,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Idle as u8),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    /// Claim the session for one generation run
    ///
    /// Returns `None` if a generation is already in flight or the session
    /// is closed. The claim is released when the guard is dropped.
    ///
    /// # Examples
    /// ```
    /// use maze_runner::session::{Session, SessionState};
    ///
    /// let session = Session::new();
    /// let guard = session.try_begin_generation().unwrap();
    /// assert!(session.try_begin_generation().is_none());
    /// drop(guard);
    /// assert_eq!(session.state(), SessionState::Idle);
    /// ```
    pub fn try_begin_generation(&self) -> Option<GenerationGuard<'_>> {
        self.state
            .compare_exchange(
                SessionState::Idle as u8,
                SessionState::Generating as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()
            .map(|_| GenerationGuard { session: self })
    }

    /// Terminate the session; sticky
    pub fn close(&self) {
        self.state
            .store(SessionState::Closed as u8, Ordering::Release);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive claim on a [Session] for the duration of one maze generation
#[derive(Debug)]
pub struct GenerationGuard<'a> {
    session: &'a Session,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        // A close during generation must survive the release
        let _ = self.session.state.compare_exchange(
            SessionState::Generating as u8,
            SessionState::Idle as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
