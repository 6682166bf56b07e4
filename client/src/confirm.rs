//! [`Confirm`]ation gate definitions.

/// Gate asking the user to confirm a destructive operation.
pub trait Confirm {
    /// Asks the user, returning whether the operation is confirmed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// [`Confirm`]ation gate answering the same way every time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Always(pub bool);

impl Confirm for Always {
    fn confirm(&mut self, _: &str) -> bool {
        self.0
    }
}
