//! The draw: one random cycle over a room's participants.
//!
//! Everyone is shuffled into a line and gives to whoever stands next to them,
//! the last giving to the first. A single cycle of length n >= 2 can never map
//! anyone to themselves.

use rand::{seq::SliceRandom, Rng};

/// One outgoing edge of the assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing<'a, T> {
    pub giver: &'a T,
    pub receiver: &'a T,
}

/// Shuffle `pool` (Fisher–Yates) and pair position i with position (i + 1) mod n.
///
/// Returns `None` when there are fewer than two entries.
pub fn draw_with<'a, T, R>(pool: &'a [T], rng: &mut R) -> Option<Vec<Pairing<'a, T>>>
where
    R: Rng + ?Sized,
{
    if pool.len() < 2 {
        return None;
    }
    let mut order: Vec<&T> = pool.iter().collect();
    order.shuffle(rng);

    let n = order.len();
    let pairings = (0..n)
        .map(|i| Pairing { giver: order[i], receiver: order[(i + 1) % n] })
        .collect();
    Some(pairings)
}
