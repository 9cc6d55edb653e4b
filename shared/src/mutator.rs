use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};

use thiserror::Error;

use crate::{diff_mask::DiffMask, types::MemberIndex};

/// Errors that can occur while recording member mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutatorError {
    /// The diff mask is already borrowed further up the call stack
    #[error("Diff mask is already borrowed; mutations cannot be recorded while the mask is being read")]
    MaskBorrowed,
}

/// Receives notice that a member was mutated
pub trait PropertyMutate {
    /// Returns whether the mutation was recorded
    fn mutate(&mut self, member_index: MemberIndex) -> bool;
}

/// Authority-side end of a change-notification channel. Collects the
/// members mutated since the last diff pass.
#[derive(Clone)]
pub struct MutReceiver {
    mask: Rc<RefCell<DiffMask>>,
}

impl MutReceiver {
    pub fn new(diff_mask_length: u8) -> Self {
        Self {
            mask: Rc::new(RefCell::new(DiffMask::new(diff_mask_length))),
        }
    }

    pub fn mask(&self) -> Ref<'_, DiffMask> {
        self.mask.borrow()
    }

    pub fn diff_mask_is_clear(&self) -> bool {
        self.mask.borrow().is_clear()
    }

    pub fn mutate(&self, member_index: MemberIndex) {
        self.mask.borrow_mut().set_bit(member_index, true);
    }

    pub fn clear_mask(&self) {
        self.mask.borrow_mut().clear();
    }

    // Try versions that return Result instead of panicking

    pub fn try_mutate(&self, member_index: MemberIndex) -> Result<(), MutatorError> {
        let mut mask = self
            .mask
            .try_borrow_mut()
            .map_err(|_| MutatorError::MaskBorrowed)?;
        mask.set_bit(member_index, true);
        Ok(())
    }

    pub fn try_clear_mask(&self) -> Result<(), MutatorError> {
        let mut mask = self
            .mask
            .try_borrow_mut()
            .map_err(|_| MutatorError::MaskBorrowed)?;
        mask.clear();
        Ok(())
    }
}

impl PropertyMutate for MutReceiver {
    fn mutate(&mut self, member_index: MemberIndex) -> bool {
        self.try_mutate(member_index).is_ok()
    }
}

/// Handed to a tracked object so its setters can flag mutated members
#[derive(Clone)]
pub struct PropertyMutator {
    inner: Rc<RefCell<dyn PropertyMutate>>,
}

impl PropertyMutator {
    pub fn new<M: PropertyMutate + 'static>(mutator: M) -> Self {
        Self {
            inner: Rc::new(RefCell::new(mutator)),
        }
    }

    /// Flags `member_index` as mutated. Returns false if the flag could not
    /// be recorded.
    pub fn mutate(&self, member_index: MemberIndex) -> bool {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return false;
        };
        inner.mutate(member_index)
    }
}
