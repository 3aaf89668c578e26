//! The dispatch trait shared by every state machine.

/// A state machine driven by a closed set of commands.
///
/// The surrounding UI composes every control the same way: build a command,
/// hand it to `dispatch`, then schedule a commit if the state moved.
pub trait Reducer {
    type Command;

    /// Apply one command, returning whether any state changed.
    ///
    /// Commands that turn out to be no-ops (adding a value that is already
    /// present, committing a value equal to the current one) return `false`
    /// and leave the state untouched.
    fn dispatch(&mut self, command: Self::Command) -> bool;
}

/// Store `value` in `slot` unless it is already equal, reporting a change.
pub(crate) fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
