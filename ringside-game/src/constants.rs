//! Centralized arena geometry and timing constants for Ringside combat.
//!
//! Per-opponent tuning lives in the boss roster; everything here is shared by
//! every encounter and only changes through reviewed code edits.

// Arena --------------------------------------------------------------------
pub const SCREEN_WIDTH: i32 = 128;
pub const RING_TOP: i32 = 10;
pub const RING_BOTTOM: i32 = 58;
pub const RING_LEFT: i32 = 6;
pub const RING_RIGHT: i32 = 121;

/// Fighters are 16x24 sprites; positions refer to the top-left corner.
pub const FIGHTER_WIDTH: i32 = 16;
pub const FIGHTER_HEIGHT: i32 = 24;

pub const PLAYER_Y: i32 = RING_BOTTOM - FIGHTER_HEIGHT - 2;
pub const OPPONENT_Y: i32 = RING_TOP + 6;
pub const HOME_X: i32 = SCREEN_WIDTH / 2 - FIGHTER_WIDTH / 2;

/// Horizontal clamp applied to every fighter position.
pub const ARENA_MIN_X: i32 = RING_LEFT + 3;
pub const ARENA_MAX_X: i32 = RING_RIGHT - 3 - FIGHTER_WIDTH;

// Combat -------------------------------------------------------------------
pub const PUNCH_RANGE: i32 = 16;
pub const NEAR_MARGIN: i32 = 2;
pub const PLAYER_MAX_HEALTH: u32 = 10;
pub const HIT_STUN_MS: u64 = 260;
pub const DODGE_MS: u64 = 220;
pub const DODGE_OFFSET: i32 = 20;
pub const BLINK_INTERVAL_MS: u64 = 80;

// Opponent AI --------------------------------------------------------------
pub const SHUFFLE_ODDS: u32 = 4;
pub const SHUFFLE_STEP: i32 = 1;
pub const SHUFFLE_RANGE: i32 = 5;
pub const SHUFFLE_BASE_MS: u64 = 350;
pub const SHUFFLE_JITTER_MS: u32 = 400;
pub const PASS_BASE_MS: u64 = 300;
pub const PASS_JITTER_MS: u32 = 500;
pub const FIRST_DECISION_DELAY_MS: u64 = 700;
pub const FIRST_SHUFFLE_DELAY_MS: u64 = 450;

// Platform -----------------------------------------------------------------
/// Reference cadence of the device render loop.
pub const FRAME_MS: u64 = 33;
/// Capacity of the device input queue.
pub const INPUT_QUEUE_CAPACITY: usize = 8;

// Banners ------------------------------------------------------------------
pub(crate) const BANNER_NEW_GAME_MS: u64 = 900;
pub(crate) const BANNER_INTRO_MS: u64 = 700;
pub(crate) const BANNER_OPEN_MS: u64 = 350;
pub(crate) const BANNER_HIT_MS: u64 = 350;
pub(crate) const BANNER_BLOCK_MS: u64 = 240;
pub(crate) const BANNER_GOOD_MS: u64 = 300;
pub(crate) const BANNER_BOSS_DOWN_MS: u64 = 800;
pub(crate) const BANNER_TERMINAL_MS: u64 = 2000;
