//! Engine parameters and fixed tables.
//!
//! Board size is a runtime value (up to [`MAXSIZE`]); everything that
//! depends on it is rebuilt by [`crate::topology::Topology`] when the
//! size changes. The constants here are the search and playout tunables
//! plus the fixed data the GTP adapter needs (coordinate letters,
//! handicap stone tables).

// =============================================================================
// Board Geometry
// =============================================================================

/// Largest supported board side.
pub const MAXSIZE: usize = 19;

/// Largest supported board area.
pub const MAXSIZE2: usize = MAXSIZE * MAXSIZE;

/// The pass move. Point 0 is never a board point.
pub const PASS: usize = 0;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default number of playouts per move decision.
pub const DEF_PLAYOUTS: u32 = 10_000;

/// Node capacity of each of the two tree arenas.
pub const DEF_TREE_NODES: usize = 300_000;

/// A node is expanded once its visit count exceeds this.
pub const EXPAND_VISITS: f64 = 2.0;

/// Bias constant of the RAVE/direct blend: beta decays as direct visits
/// accumulate relative to RAVE visits.
pub const RAVE_BIAS: f64 = 1.0 / 3000.0;

/// Selection value of a node with neither direct nor RAVE visits.
pub const FIRST_PLAY_URGENCY: f64 = 1.0;

/// Resign when the best child's value drops below this.
pub const RESIGN_THRESHOLD: f64 = 0.10;

/// Pass early when the pass child's value exceeds this.
pub const EARLY_PASS_THRESHOLD: f64 = 0.90;

// =============================================================================
// Playout Parameters
// =============================================================================

/// A playout is discarded once it exceeds this many moves per board point.
pub const MAX_PLAYOUT_FACTOR: usize = 2;

/// Mercy rule: a playout ends when one color's stone surplus exceeds
/// board area divided by this.
pub const MERCY_DIVISOR: usize = 3;

/// Playouts used by territory scoring.
pub const SCORE_PLAYOUTS: u32 = 10_000;

// =============================================================================
// Superko
// =============================================================================

/// Number of recent position keys kept for the bounded superko check.
pub const SUPERKO_WINDOW: usize = 6;

// =============================================================================
// Adapter Data
// =============================================================================

/// Column letters in GTP order ('I' is skipped by convention).
pub const COORDINATES: [char; MAXSIZE] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T',
];

/// Fixed handicap points for 19x19, indexed by `9 - handicap`.
pub const HANDICAP19: [[usize; 9]; 8] = [
    [61, 301, 289, 73, 175, 187, 67, 295, 181],
    [61, 301, 289, 73, 175, 187, 67, 295, 0],
    [61, 301, 289, 73, 175, 187, 181, 0, 0],
    [61, 301, 289, 73, 175, 187, 0, 0, 0],
    [61, 301, 289, 73, 181, 0, 0, 0, 0],
    [61, 301, 289, 73, 0, 0, 0, 0, 0],
    [61, 301, 289, 0, 0, 0, 0, 0, 0],
    [61, 301, 0, 0, 0, 0, 0, 0, 0],
];

/// Fixed handicap points for 13x13, indexed by `9 - handicap`.
pub const HANDICAP13: [[usize; 9]; 8] = [
    [43, 127, 121, 49, 82, 88, 46, 124, 85],
    [43, 127, 121, 49, 82, 88, 46, 124, 0],
    [43, 127, 121, 49, 82, 88, 85, 0, 0],
    [43, 127, 121, 49, 82, 88, 0, 0, 0],
    [43, 127, 121, 49, 85, 0, 0, 0, 0],
    [43, 127, 121, 49, 0, 0, 0, 0, 0],
    [43, 127, 121, 0, 0, 0, 0, 0, 0],
    [43, 127, 0, 0, 0, 0, 0, 0, 0],
];

/// Fixed handicap points for 9x9, indexed by `9 - handicap`.
pub const HANDICAP9: [[usize; 9]; 8] = [
    [21, 61, 57, 25, 39, 43, 23, 59, 41],
    [21, 61, 57, 25, 39, 43, 23, 59, 0],
    [21, 61, 57, 25, 39, 43, 41, 0, 0],
    [21, 61, 57, 25, 39, 43, 0, 0, 0],
    [21, 61, 57, 25, 41, 0, 0, 0, 0],
    [21, 61, 57, 25, 0, 0, 0, 0, 0],
    [21, 61, 57, 0, 0, 0, 0, 0, 0],
    [21, 61, 0, 0, 0, 0, 0, 0, 0],
];
