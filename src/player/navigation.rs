//! Which track comes next or before, given the shuffle flag.

use rand::Rng;

/// Index after `current`. Sequential order wraps to the start; shuffle picks
/// uniformly among the other tracks. `None` for an empty list.
pub fn next_index<R: Rng + ?Sized>(
    current: Option<usize>,
    len: usize,
    shuffle: bool,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if shuffle {
        return Some(random_other(current, len, rng));
    }
    Some(match current {
        Some(i) => (i + 1) % len,
        None => 0,
    })
}

/// Index before `current`. Sequential order wraps to the end; shuffle
/// behaves exactly like `next_index`.
pub fn prev_index<R: Rng + ?Sized>(
    current: Option<usize>,
    len: usize,
    shuffle: bool,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if shuffle {
        return Some(random_other(current, len, rng));
    }
    Some(match current {
        Some(i) if i > 0 => i.min(len) - 1,
        _ => len - 1,
    })
}

/// Uniform draw from `[0, len)`, redrawn until it differs from `current`.
/// A single-track list has nothing else to pick, so it repeats.
fn random_other<R: Rng + ?Sized>(current: Option<usize>, len: usize, rng: &mut R) -> usize {
    if len == 1 {
        return 0;
    }
    loop {
        let candidate = rng.gen_range(0..len);
        if Some(candidate) != current {
            return candidate;
        }
    }
}
