//! Poller lifecycle state machine
//!
//! Pure state machine: receives a command, returns (new_state, action).
//! `Poller` executes the task spawning and cancellation implied by each action.

/// Whether the tick loop is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Commands from the admin API or the composition root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}

/// Actions the caller should execute after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Spawn the tick loop with a fresh cancellation token
    SpawnLoop,
    /// Cancel the token and await the loop task
    CancelLoop,
    /// Start while running: warn, no-op
    AlreadyRunning,
    /// Stop while stopped: warn, no-op
    AlreadyStopped,
}

/// Handle a lifecycle command. Pure function: no I/O.
pub fn transition(state: LoopState, command: Command) -> (LoopState, Action) {
    match (state, command) {
        (LoopState::Stopped, Command::Start) => (LoopState::Running, Action::SpawnLoop),
        (LoopState::Running, Command::Start) => (LoopState::Running, Action::AlreadyRunning),
        (LoopState::Running, Command::Stop) => (LoopState::Stopped, Action::CancelLoop),
        (LoopState::Stopped, Command::Stop) => (LoopState::Stopped, Action::AlreadyStopped),
    }
}
