//! Multi-agent handoff coordination (SPEC_FULL §4.6): a coordinator agent
//! and a set of specialists, routed by handoff signals embedded in their
//! replies, built as a single executor over `workflow-core`/
//! `workflow-runtime` rather than a bespoke router loop.

pub mod coordinator;
pub mod participants;
pub mod signal;

pub use coordinator::{
    AwaitingInput, HandoffCoordinator, HandoffCoordinatorBuilder, HandoffError, HandoffTurn, InteractionMode, TerminationFn, CONVERSATION_KEY, STATE_KEY,
};
pub use participants::{ParticipantFactory, Participants};
pub use signal::detect_handoff;
