//! Reusable participant fixtures.
//!
//! - [`Recorder`]: logs every notification it receives into a shared log.
//! - [`SliceCache`]: resolves one buffer slice at finalization and keeps it.
//! - [`FailingParticipant`]: fails deterministically after N notifications.

use std::cell::RefCell;
use std::rc::Rc;

use carve_core::{Scalar, View};
use carve_problem::{Participant, Problem, ProblemError};

/// Notification log shared between several [`Recorder`]s.
///
/// Entries are `"<problem>.<label>"`, in notification order.
pub type NotificationLog = Rc<RefCell<Vec<String>>>;

/// Records each finalization it is told about.
pub struct Recorder {
    pub label: String,
    pub calls: usize,
    log: NotificationLog,
}

impl Recorder {
    pub fn new(label: impl Into<String>, log: &NotificationLog) -> Self {
        Self {
            label: label.into(),
            calls: 0,
            log: Rc::clone(log),
        }
    }
}

impl<'s> Participant<'s> for Recorder {
    fn structure_finalized(&mut self, problem: &Problem<'s>) -> Result<(), ProblemError> {
        self.calls += 1;
        self.log
            .borrow_mut()
            .push(format!("{}.{}", problem.name(), self.label));
        Ok(())
    }
}

/// Resolves slice `offset` of a named buffer when the structure is
/// finalized, the way a real element caches its working views.
pub struct SliceCache<'s> {
    pub buffer: String,
    pub offset: usize,
    pub view: Option<View<'s, Scalar>>,
}

impl<'s> SliceCache<'s> {
    pub fn new(buffer: impl Into<String>, offset: usize) -> Self {
        Self {
            buffer: buffer.into(),
            offset,
            view: None,
        }
    }
}

impl<'s> Participant<'s> for SliceCache<'s> {
    fn structure_finalized(&mut self, problem: &Problem<'s>) -> Result<(), ProblemError> {
        let buffer = problem
            .get_buffer(&self.buffer)
            .ok_or_else(|| ProblemError::UnknownBuffer {
                name: self.buffer.clone(),
            })?;
        self.view = Some(buffer.resolve(self.offset)?);
        Ok(())
    }
}

/// Succeeds `succeed_count` times, then fails on every later notification.
pub struct FailingParticipant {
    pub succeed_count: usize,
    pub calls: usize,
}

impl FailingParticipant {
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            calls: 0,
        }
    }
}

impl<'s> Participant<'s> for FailingParticipant {
    fn structure_finalized(&mut self, _problem: &Problem<'s>) -> Result<(), ProblemError> {
        self.calls += 1;
        if self.calls > self.succeed_count {
            return Err(ProblemError::Rejected {
                reason: format!("failed on notification {}", self.calls),
            });
        }
        Ok(())
    }
}
