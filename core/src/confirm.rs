//! Confirmation gate for destructive actions.
//!
//! `PostStore::delete` takes a `DeleteConfirmation`, which only comes out of
//! `DeleteRequest::confirm` after the prompt answered yes. Tests and
//! front ends plug in any `Confirm` implementation instead of an interactive
//! dialog.

pub const DELETE_QUESTION: &str = "Are you sure you want to delete this post?";

/// Something that can ask the user a yes/no question.
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    id: i64,
}

impl DeleteRequest {
    pub fn new(id: i64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// `None` when the user declined.
    pub fn confirm(self, prompt: &dyn Confirm) -> Option<DeleteConfirmation> {
        prompt
            .confirm(DELETE_QUESTION)
            .then_some(DeleteConfirmation { id: self.id })
    }
}

/// Proof that deleting post `id` was confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: i64,
}

impl DeleteConfirmation {
    /// For callers that collected consent up front, such as a `--yes` flag.
    pub fn assume_confirmed(id: i64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn yes_yields_confirmation_for_same_id() {
        let confirmation = DeleteRequest::new(9).confirm(&|_: &str| true).unwrap();
        assert_eq!(confirmation.id(), 9);
    }

    #[test]
    fn no_yields_nothing() {
        assert!(DeleteRequest::new(9).confirm(&|_: &str| false).is_none());
    }

    #[test]
    fn prompt_sees_the_question() {
        let asked = RefCell::new(String::new());
        let prompt = |q: &str| {
            asked.replace(q.to_string());
            true
        };
        DeleteRequest::new(1).confirm(&prompt);
        assert_eq!(asked.into_inner(), DELETE_QUESTION);
    }
}
