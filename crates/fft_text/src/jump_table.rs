//! Translation between backward distances and the 13-bit jump values stored
//! in compression pointers.
//!
//! The game skips two bytes for every 256 when it measures a jump, so a
//! stored jump `j` refers to a distance of `j - (j / 256) * 2`. Several jump
//! values land on the same distance; the encoder always picks the largest.

/// Stored jump values are drawn from `0..JUMP_LIMIT`.
pub const JUMP_LIMIT: usize = 3900;

/// Largest backward distance that has a jump value.
pub const MAX_DISTANCE: usize = distance_of(JUMP_LIMIT - 1);

static JUMPS: [u16; MAX_DISTANCE + 1] = build();

const fn distance_of(jump: usize) -> usize {
    jump - (jump / 256) * 2
}

const fn build() -> [u16; MAX_DISTANCE + 1] {
    let mut table = [0u16; MAX_DISTANCE + 1];
    let mut jump = 0;
    while jump < JUMP_LIMIT {
        // later jumps overwrite earlier ones for the same distance
        table[distance_of(jump)] = jump as u16;
        jump += 1;
    }
    table
}

/// Returns the jump value to store for a backward `distance`, or `None` if
/// the distance is too far to be expressed.
pub fn jump_for_distance(distance: usize) -> Option<u16> {
    JUMPS.get(distance).copied()
}

/// Returns the backward distance a stored jump value refers to.
pub fn distance_for_jump(jump: u16) -> usize {
    distance_of(jump as usize)
}
