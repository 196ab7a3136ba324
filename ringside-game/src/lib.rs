//! Ringside Game Engine
//!
//! Platform-agnostic combat core for a three-boss boxing game: fighter state
//! machines, punch resolution, the opponent scheduler, and session flow.
//! Rendering and input devices live with the host; this crate only consumes
//! timestamps and discrete inputs.

pub mod ai;
pub mod boss;
pub mod clock;
pub mod combat;
pub mod constants;
pub mod driver;
pub mod event;
pub mod fighter;
pub mod input;
pub mod rng;
pub mod session;

// Re-export commonly used types
pub use ai::{AiStep, Decision, OpponentAi};
pub use boss::{BOSS_COUNT, BossProfile, BossRoster, RosterError};
pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use combat::{Bout, OpponentPunch, PlayerPunch};
pub use driver::FrameDriver;
pub use event::{Banner, CombatEvent, CombatEventKind, Message, Side};
pub use fighter::{DodgeDirection, Fighter, FighterState, Position};
pub use input::{InputEvent, InputQueue, InputQueueError};
pub use rng::{RandomSource, ScriptedSource, SeededSource};
pub use session::{MatchOutcome, Session, SessionSnapshot};
