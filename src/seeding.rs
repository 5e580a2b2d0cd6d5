use crate::types::PlayerId;

// ── Fair seed order ────────────────────────────────────────────────────

/// Canonical fair-seeding permutation for a bracket of `2^exp` slots.
///
/// Built by recursive doubling: start from `[1, 2]` and for each level L
/// follow every seed `a` with its complement `2^L + 1 - a`. Adjacent pairs of
/// the result are the first-round pairings; seed 1 and seed 2 land in
/// opposite halves and can only meet in the final.
pub fn seed_order(exp: u32) -> Vec<PlayerId> {
    if exp == 0 {
        return vec![1];
    }
    let mut order: Vec<PlayerId> = vec![1, 2];
    for level in 2..=exp {
        let complement = (1u32 << level) + 1;
        let mut next = Vec::with_capacity(order.len() * 2);
        for &seed in &order {
            next.push(seed);
            next.push(complement - seed);
        }
        order = next;
    }
    order
}

// ── Shuffle capability ─────────────────────────────────────────────────

/// External permutation capability used when the caller's player list is not
/// pre-seeded. Implementations permute seed positions; the bracket builder
/// never draws randomness itself.
pub trait Shuffle {
    fn shuffle(&mut self, order: &mut [u32]);
}

/// Deterministic xorshift64 generator backing [`SeededShuffle`].
#[derive(Clone, Debug)]
struct ShuffleRng {
    state: u64,
}

impl ShuffleRng {
    fn new(seed: u64) -> Self {
        let mut state = seed;
        if state == 0 {
            state = 0x9E37_79B9_7F4A_7C15;
        }
        ShuffleRng { state }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Default [`Shuffle`] implementation: Fisher-Yates driven by a seeded
/// xorshift64 state, so the same seed always yields the same permutation.
#[derive(Clone, Debug)]
pub struct SeededShuffle {
    rng: ShuffleRng,
}

impl SeededShuffle {
    pub fn new(seed: u64) -> Self {
        SeededShuffle {
            rng: ShuffleRng::new(seed),
        }
    }
}

impl Shuffle for SeededShuffle {
    fn shuffle(&mut self, order: &mut [u32]) {
        for i in (1..order.len()).rev() {
            let j = (self.rng.next_u64() % (i as u64 + 1)) as usize;
            order.swap(i, j);
        }
    }
}
