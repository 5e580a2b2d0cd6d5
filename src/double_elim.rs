use std::collections::HashMap;

use tracing::debug;

use crate::seeding::{seed_order, Shuffle};
use crate::types::{BracketError, BracketOptions, MatchRef, MatchSlot, PlayerId};

/// Match slot over synthesized seed-numbered players.
pub type Match = MatchSlot<PlayerId>;

// ── Public API ─────────────────────────────────────────────────────────

/// Generate the layout for `count` synthesized players numbered 1..=count in
/// seed order.
pub fn generate(count: u32, options: &BracketOptions) -> Result<Vec<Match>, BracketError> {
    build(count, options.starting_round)
}

/// Generate a layout for an explicit pre-seeded list: seed 1 is the first
/// element, seed N the last.
pub fn generate_ordered<P: Clone>(
    players: &[P],
    options: &BracketOptions,
) -> Result<Vec<MatchSlot<P>>, BracketError> {
    let raw = build(players.len() as u32, options.starting_round)?;
    Ok(assign_players(raw, |seed| {
        players[(seed - 1) as usize].clone()
    }))
}

/// Generate a layout for an unseeded list, assigning seed positions through
/// the external [`Shuffle`] capability.
pub fn generate_unordered<P: Clone>(
    players: &[P],
    options: &BracketOptions,
    shuffle: &mut dyn Shuffle,
) -> Result<Vec<MatchSlot<P>>, BracketError> {
    let raw = build(players.len() as u32, options.starting_round)?;
    let mut order: Vec<u32> = (0..players.len() as u32).collect();
    shuffle.shuffle(&mut order);
    Ok(assign_players(raw, |seed| {
        players[order[(seed - 1) as usize] as usize].clone()
    }))
}

fn assign_players<P>(raw: Vec<Match>, pick: impl Fn(PlayerId) -> P) -> Vec<MatchSlot<P>> {
    raw.into_iter()
        .map(|slot| MatchSlot {
            round: slot.round,
            number: slot.number,
            player1: slot.player1.map(&pick),
            player2: slot.player2.map(&pick),
            win: slot.win,
            loss: slot.loss,
        })
        .collect()
}

// ── Working set ────────────────────────────────────────────────────────

/// Append-only arena of match slots plus a `(round, match)` key index.
/// Pointers are wired through the index so construction order never matters.
struct Arena {
    slots: Vec<Match>,
    index: HashMap<(u32, u32), usize>,
}

impl Arena {
    fn new() -> Self {
        Arena {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn push(&mut self, round: u32, number: u32) {
        let idx = self.slots.len();
        self.slots.push(MatchSlot::empty(round, number));
        self.index.insert((round, number), idx);
    }

    fn contains(&self, target: MatchRef) -> bool {
        self.index.contains_key(&(target.round, target.number))
    }

    fn get(&self, round: u32, number: u32) -> &Match {
        &self.slots[self.index[&(round, number)]]
    }

    fn get_mut(&mut self, round: u32, number: u32) -> &mut Match {
        &mut self.slots[self.index[&(round, number)]]
    }

    fn set_win(&mut self, round: u32, number: u32, target: MatchRef) {
        debug_assert!(self.contains(target), "win pointer to missing match");
        self.get_mut(round, number).win = Some(target);
    }

    fn set_loss(&mut self, round: u32, number: u32, target: MatchRef) {
        debug_assert!(self.contains(target), "loss pointer to missing match");
        self.get_mut(round, number).loss = Some(target);
    }

    fn round_len(&self, round: u32) -> u32 {
        self.slots.iter().filter(|m| m.round == round).count() as u32
    }

    fn max_round(&self) -> u32 {
        self.slots.iter().map(|m| m.round).max().unwrap_or(0)
    }
}

/// Cursors threaded through the cross-linking passes: the winners and losers
/// round currently being wired, the rotation pass counter feeding
/// [`fill_pattern`], and the merge offset advanced at structural merge
/// points.
struct LinkState {
    win_round: u32,
    lose_round: u32,
    pass: u32,
    merge_offset: u32,
}

impl LinkState {
    fn new(win_round: u32, lose_round: u32) -> Self {
        LinkState {
            win_round,
            lose_round,
            pass: 0,
            merge_offset: 0,
        }
    }

    fn next_pass(&mut self) -> u32 {
        let pass = self.pass;
        self.pass += 1;
        pass
    }
}

/// Rotation applied to a winners-round match sequence before draining it
/// into a losers round, cycling through four phases to keep a player away
/// from the opponent who just sent them down: identity, full reversal,
/// half-wise reversal, half swap.
fn fill_pattern(count: u32, pass: u32) -> Vec<u32> {
    let seq: Vec<u32> = (1..=count).collect();
    let half = (count / 2) as usize;
    match pass % 4 {
        0 => seq,
        1 => seq.into_iter().rev().collect(),
        2 => {
            let mut out: Vec<u32> = seq[..half].iter().rev().copied().collect();
            out.extend(seq[half..].iter().rev().copied());
            out
        }
        _ => {
            let mut out = seq[half..].to_vec();
            out.extend_from_slice(&seq[..half]);
            out
        }
    }
}

// ── Builder ────────────────────────────────────────────────────────────

struct BracketBuilder {
    arena: Arena,
    n: u32,
    floor_exp: u32,
    ceil_exp: u32,
    remainder: u32,
    starting_round: u32,
    round: u32,
    decider_round: u32,
}

pub(crate) fn build(n: u32, starting_round: u32) -> Result<Vec<Match>, BracketError> {
    if starting_round < 1 {
        return Err(BracketError::InvalidStartingRound(starting_round));
    }
    if n < 1 {
        return Err(BracketError::InvalidPlayerCount(n));
    }

    // The general layout arithmetic degenerates below four players; the two
    // smallest brackets are laid out directly.
    if n == 1 {
        let mut only = MatchSlot::empty(starting_round, 1);
        only.player1 = Some(1);
        return Ok(vec![only]);
    }
    if n == 2 {
        let decider = MatchRef::new(starting_round + 1, 1);
        let mut opener = MatchSlot::empty(starting_round, 1);
        opener.player1 = Some(1);
        opener.player2 = Some(2);
        opener.win = Some(decider);
        opener.loss = Some(decider);
        return Ok(vec![opener, MatchSlot::empty(starting_round + 1, 1)]);
    }

    let mut builder = BracketBuilder::new(n, starting_round);
    debug!(
        n,
        floor_exp = builder.floor_exp,
        ceil_exp = builder.ceil_exp,
        remainder = builder.remainder,
        starting_round,
        "laying double-elimination bracket"
    );
    builder.lay_bye_round();
    builder.lay_winners();
    builder.seed_first_round();
    builder.splice_byes();
    builder.append_decider();
    builder.lay_losers();
    builder.cross_link();
    builder.link_losers_progression();
    Ok(builder.finish())
}

impl BracketBuilder {
    fn new(n: u32, starting_round: u32) -> Self {
        let floor_exp = n.ilog2();
        let ceil_exp = if n.is_power_of_two() {
            floor_exp
        } else {
            floor_exp + 1
        };
        BracketBuilder {
            arena: Arena::new(),
            n,
            floor_exp,
            ceil_exp,
            remainder: n - (1 << floor_exp),
            starting_round,
            round: starting_round,
            decider_round: 0,
        }
    }

    fn half(&self) -> u32 {
        1 << (self.floor_exp - 1)
    }

    /// First power-of-two winners round: the starting round itself, or one
    /// later when a bye round precedes it.
    fn first_real_round(&self) -> u32 {
        self.starting_round + u32::from(self.remainder > 0)
    }

    /// Preliminary play-in round holding one empty match per excess player.
    fn lay_bye_round(&mut self) {
        if self.remainder == 0 {
            return;
        }
        for m in 1..=self.remainder {
            self.arena.push(self.round, m);
        }
        self.round += 1;
    }

    /// Winners rounds of size 2^(floorExp-1) down to 1, match m win-linking
    /// to match ceil(m/2) of the following round.
    fn lay_winners(&mut self) {
        let mut size_exp = self.floor_exp - 1;
        let mut linked = false;
        loop {
            for m in 1..=(1u32 << size_exp) {
                self.arena.push(self.round, m);
            }
            if linked {
                let prev = self.round - 1;
                for m in 1..=self.arena.round_len(prev) {
                    self.arena
                        .set_win(prev, m, MatchRef::new(self.round, (m + 1) / 2));
                }
            }
            linked = true;
            self.round += 1;
            if self.round >= self.starting_round + self.ceil_exp {
                break;
            }
            size_exp -= 1;
        }
    }

    fn seed_first_round(&mut self) {
        let order = seed_order(self.floor_exp);
        let round = self.first_real_round();
        for m in 1..=self.arena.round_len(round) {
            let a = order[(2 * (m - 1)) as usize];
            let b = order[(2 * (m - 1) + 1) as usize];
            let slot = self.arena.get_mut(round, m);
            slot.player1 = Some(a);
            slot.player2 = Some(b);
        }
    }

    /// Move every seed above the pairing threshold out of the first real
    /// round into a bye match against its mirrored seed, win-linking the bye
    /// back at the vacated slot.
    fn splice_byes(&mut self) {
        if self.remainder == 0 {
            return;
        }
        let round = self.first_real_round();
        let threshold = (1u32 << self.floor_exp) - self.remainder;
        let mut bye_no = 0u32;
        for m in 1..=self.arena.round_len(round) {
            for second_slot in [false, true] {
                let slot = self.arena.get(round, m);
                let seeded = if second_slot {
                    slot.player2
                } else {
                    slot.player1
                };
                let Some(seed) = seeded else { continue };
                if seed - 1 < threshold {
                    continue;
                }
                bye_no += 1;
                let mirror = (1u32 << self.ceil_exp) - (seed - 1);
                let bye = self.arena.get_mut(self.starting_round, bye_no);
                bye.player1 = Some(seed);
                bye.player2 = (mirror <= self.n).then_some(mirror);
                bye.win = Some(MatchRef::new(round, m));
                let vacated = self.arena.get_mut(round, m);
                if second_slot {
                    vacated.player2 = None;
                } else {
                    vacated.player1 = None;
                }
            }
        }
        debug_assert_eq!(bye_no, self.remainder, "bye count mismatch");
    }

    /// The decider slot: a single appended match the winners finalist and the
    /// losers-bracket champion both win-link into. It is the one terminal
    /// match of the layout.
    fn append_decider(&mut self) {
        self.arena.push(self.round, 1);
        let prev = self.round - 1;
        self.arena.set_win(prev, 1, MatchRef::new(self.round, 1));
        self.decider_round = self.round;
        self.round += 1;
    }

    /// Losers skeleton: the bye-absorption pre-fill rounds, then two rounds
    /// per winners level (a minor round merging fresh winners losers with
    /// survivors, and a major round of survivors only).
    fn lay_losers(&mut self) {
        if self.remainder > 0 {
            if self.remainder <= self.half() {
                for m in 1..=self.remainder {
                    self.arena.push(self.round, m);
                }
                self.round += 1;
            } else {
                for m in 1..=(self.remainder - self.half()) {
                    self.arena.push(self.round, m);
                }
                self.round += 1;
                for m in 1..=self.half() {
                    self.arena.push(self.round, m);
                }
                self.round += 1;
            }
        }
        if self.floor_exp >= 2 {
            let mut level = self.floor_exp - 2;
            loop {
                for _ in 0..2 {
                    for m in 1..=(1u32 << level) {
                        self.arena.push(self.round, m);
                    }
                    self.round += 1;
                }
                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }
    }

    // ── Cross linking ──────────────────────────────────────────────────

    fn cross_link(&mut self) {
        let mut link = LinkState::new(self.starting_round, self.decider_round + 1);
        if self.remainder == 0 {
            self.drain_initial_even(&mut link);
        } else if self.remainder <= self.half() {
            self.drain_initial_small(&mut link);
        } else {
            self.drain_initial_large(&mut link);
        }
        self.finish_cross_links(&mut link);
    }

    /// Power-of-two field: the first winners round drains 2:1 into the first
    /// losers round.
    fn drain_initial_even(&mut self, link: &mut LinkState) {
        let pattern = fill_pattern(self.arena.round_len(link.win_round), link.next_pass());
        let mut feed = pattern.into_iter();
        for lm in 1..=self.arena.round_len(link.lose_round) {
            for _ in 0..2 {
                if let Some(wm) = feed.next() {
                    self.arena
                        .set_loss(link.win_round, wm, MatchRef::new(link.lose_round, lm));
                }
            }
        }
        link.win_round += 1;
        link.lose_round += 1;
    }

    /// Remainder at most half a round: one pre-fill losers round absorbs the
    /// bye losers, and the first real winners round drains around it.
    fn drain_initial_small(&mut self, link: &mut LinkState) {
        // Bye round: one loser per pre-fill match.
        let pattern = fill_pattern(self.arena.round_len(link.win_round), link.next_pass());
        for (i, lm) in (1..=self.arena.round_len(link.lose_round)).enumerate() {
            self.arena
                .set_loss(link.win_round, pattern[i], MatchRef::new(link.lose_round, lm));
        }
        link.win_round += 1;
        link.lose_round += 1;

        // First real winners round: two losers per minor-round slot, except
        // that for every slot shorted by a bye placeholder one loser diverts
        // into the pre-fill round instead. Shorted slots are counted, not
        // merely flagged: at remainder = 2^(floorExp-1) two bye-fed matches
        // collapse onto the same slot and both losers must divert.
        let prefill_round = self.decider_round + 1;
        let pattern = fill_pattern(self.arena.round_len(link.win_round), link.next_pass());
        let mut shorted: HashMap<u32, u32> = HashMap::new();
        for slot in self.bye_shorted_slots() {
            *shorted.entry(slot).or_insert(0) += 1;
        }
        let mut diverted = 0u32;
        let mut feed = pattern.into_iter();
        let minor_len = self.arena.round_len(link.lose_round);
        if minor_len == 0 {
            // floorExp 1: no main losers rounds exist, every loser joins the
            // pre-fill round directly.
            for wm in feed {
                diverted += 1;
                self.arena
                    .set_loss(link.win_round, wm, MatchRef::new(prefill_round, diverted));
            }
        } else {
            for lm in 1..=minor_len {
                for _ in 0..2 {
                    let Some(wm) = feed.next() else { break };
                    let covered = match shorted.get_mut(&lm) {
                        Some(count) if *count > 0 => {
                            *count -= 1;
                            true
                        }
                        _ => false,
                    };
                    if covered {
                        diverted += 1;
                        self.arena
                            .set_loss(link.win_round, wm, MatchRef::new(prefill_round, diverted));
                    } else {
                        self.arena
                            .set_loss(link.win_round, wm, MatchRef::new(link.lose_round, lm));
                    }
                }
            }
        }
        link.win_round += 1;
        link.lose_round += 1;

        // Pre-fill winners advance into the slots the byes shorted.
        let routes = self.bye_shorted_slots();
        for (i, lm) in (1..=self.arena.round_len(prefill_round)).enumerate() {
            let target = MatchRef::new(prefill_round + 1, routes[i]);
            if self.arena.contains(target) {
                self.arena.set_win(prefill_round, lm, target);
            }
        }
    }

    /// Remainder above half a round: the pre-fill stage is split in two, and
    /// the bye round drains into both. Where the first real round holds a
    /// fully vacated match, the two byes feeding it send their losers to the
    /// same first pre-fill match.
    fn drain_initial_large(&mut self, link: &mut LinkState) {
        let first_prefill = link.lose_round;
        link.lose_round += 1;
        let second_prefill = link.lose_round;

        let pattern = fill_pattern(self.arena.round_len(link.win_round), link.next_pass());
        let double_byes = self.double_bye_matches();
        let mut feed = pattern.into_iter();
        let mut absorbed = 0u32;
        for lm in 1..=self.arena.round_len(second_prefill) {
            let Some(first) = feed.next() else { break };
            if double_byes.contains(&lm) {
                absorbed += 1;
                self.arena
                    .set_loss(link.win_round, first, MatchRef::new(first_prefill, absorbed));
                if let Some(second) = feed.next() {
                    self.arena
                        .set_loss(link.win_round, second, MatchRef::new(first_prefill, absorbed));
                }
            } else {
                self.arena
                    .set_loss(link.win_round, first, MatchRef::new(second_prefill, lm));
            }
        }
        link.win_round += 1;

        // First pre-fill winners advance into the fully vacated slots.
        for (i, lm) in (1..=self.arena.round_len(first_prefill)).enumerate() {
            self.arena
                .set_win(first_prefill, lm, MatchRef::new(second_prefill, double_byes[i]));
        }
    }

    /// Walk the remaining winners rounds up to the winners final, draining
    /// each into its matched losers round and advancing the merge offset
    /// whenever the two rounds reach equal size.
    fn finish_cross_links(&mut self, link: &mut LinkState) {
        for wr in link.win_round..self.decider_round {
            let mut dest = link.lose_round - link.win_round + link.merge_offset + wr;
            if self.arena.round_len(dest) == self.arena.round_len(dest + 1) {
                dest += 1;
                link.merge_offset += 1;
            }
            let pattern = fill_pattern(self.arena.round_len(wr), link.next_pass());
            for (i, lm) in (1..=self.arena.round_len(dest)).enumerate() {
                if let Some(&wm) = pattern.get(i) {
                    self.arena.set_loss(wr, wm, MatchRef::new(dest, lm));
                }
            }
        }
    }

    /// Win-link the losers ladder forward (1:1 where round sizes match, 2:1
    /// where they halve) and point the last losers round at the decider slot.
    fn link_losers_progression(&mut self) {
        let max_round = self.arena.max_round();
        let first = if self.remainder == 0 {
            self.decider_round + 1
        } else {
            self.decider_round + 2
        };
        for round in first..max_round {
            let len = self.arena.round_len(round);
            let next_len = self.arena.round_len(round + 1);
            for lm in 1..=len {
                let target = if len == next_len { lm } else { (lm - 1) / 2 + 1 };
                self.arena.set_win(round, lm, MatchRef::new(round + 1, target));
            }
        }
        if max_round > self.decider_round {
            self.arena
                .set_win(max_round, 1, MatchRef::new(self.decider_round, 1));
        }
    }

    // ── Bye bookkeeping ────────────────────────────────────────────────

    /// Minor-round slot ceil(m/2) for every first-real-round match a bye
    /// feeds into, in match order.
    fn bye_shorted_slots(&self) -> Vec<u32> {
        let round = self.first_real_round();
        let mut out = Vec::new();
        for m in 1..=self.arena.round_len(round) {
            let slot = self.arena.get(round, m);
            if slot.player1.is_none() || slot.player2.is_none() {
                out.push((m + 1) / 2);
            }
        }
        out
    }

    /// First-real-round matches whose both slots were vacated by byes.
    fn double_bye_matches(&self) -> Vec<u32> {
        let round = self.first_real_round();
        (1..=self.arena.round_len(round))
            .filter(|&m| {
                let slot = self.arena.get(round, m);
                slot.player1.is_none() && slot.player2.is_none()
            })
            .collect()
    }

    fn finish(self) -> Vec<Match> {
        debug_assert!(self.pointers_resolve(), "dangling pointer in layout");
        debug!(
            matches = self.arena.slots.len(),
            rounds = self.arena.max_round() - self.starting_round + 1,
            "bracket layout complete"
        );
        self.arena.slots
    }

    fn pointers_resolve(&self) -> bool {
        let mut terminals = 0;
        for slot in &self.arena.slots {
            match slot.win {
                Some(target) if !self.arena.contains(target) => return false,
                Some(_) => {}
                None => terminals += 1,
            }
            if let Some(target) = slot.loss {
                if !self.arena.contains(target) {
                    return false;
                }
            }
        }
        terminals == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeding::SeededShuffle;

    fn layout(n: u32) -> Vec<Match> {
        generate(n, &BracketOptions::default()).unwrap()
    }

    fn find(matches: &[Match], round: u32, number: u32) -> &Match {
        matches
            .iter()
            .find(|m| m.round == round && m.number == number)
            .unwrap()
    }

    fn round_len(matches: &[Match], round: u32) -> usize {
        matches.iter().filter(|m| m.round == round).count()
    }

    #[test]
    fn fill_pattern_rotations() {
        assert_eq!(fill_pattern(4, 0), vec![1, 2, 3, 4]);
        assert_eq!(fill_pattern(4, 1), vec![4, 3, 2, 1]);
        assert_eq!(fill_pattern(4, 2), vec![2, 1, 4, 3]);
        assert_eq!(fill_pattern(4, 3), vec![3, 4, 1, 2]);
        assert_eq!(fill_pattern(4, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn fill_pattern_odd_count_splits_short_half_first() {
        assert_eq!(fill_pattern(5, 2), vec![2, 1, 5, 4, 3]);
        assert_eq!(fill_pattern(5, 3), vec![3, 4, 5, 1, 2]);
    }

    #[test]
    fn rejects_zero_players_and_zero_starting_round() {
        assert_eq!(
            generate(0, &BracketOptions::default()),
            Err(BracketError::InvalidPlayerCount(0))
        );
        assert_eq!(
            generate(4, &BracketOptions { starting_round: 0 }),
            Err(BracketError::InvalidStartingRound(0))
        );
    }

    #[test]
    fn one_player_is_a_single_terminal_match() {
        let matches = layout(1);
        assert_eq!(matches.len(), 1);
        let only = &matches[0];
        assert_eq!((only.round, only.number), (1, 1));
        assert_eq!(only.player1, Some(1));
        assert_eq!(only.player2, None);
        assert!(only.win.is_none() && only.loss.is_none());
    }

    #[test]
    fn two_players_route_winner_and_loser_to_the_decider() {
        let matches = layout(2);
        assert_eq!(matches.len(), 2);
        let opener = find(&matches, 1, 1);
        assert_eq!(opener.player1, Some(1));
        assert_eq!(opener.player2, Some(2));
        assert_eq!(opener.win, Some(MatchRef::new(2, 1)));
        assert_eq!(opener.loss, Some(MatchRef::new(2, 1)));
        let decider = find(&matches, 2, 1);
        assert!(decider.win.is_none() && decider.loss.is_none());
    }

    #[test]
    fn three_players_play_in_then_meet_seed_one() {
        let matches = layout(3);
        assert_eq!(matches.len(), 4);

        // Seeds 2 and 3 play in; the winner meets seed 1.
        let bye = find(&matches, 1, 1);
        assert_eq!(bye.player1, Some(2));
        assert_eq!(bye.player2, Some(3));
        assert_eq!(bye.win, Some(MatchRef::new(2, 1)));
        assert_eq!(bye.loss, Some(MatchRef::new(4, 1)));

        let opener = find(&matches, 2, 1);
        assert_eq!(opener.player1, Some(1));
        assert_eq!(opener.player2, None);
        assert_eq!(opener.win, Some(MatchRef::new(3, 1)));
        assert_eq!(opener.loss, Some(MatchRef::new(4, 1)));

        let losers_final = find(&matches, 4, 1);
        assert_eq!(losers_final.win, Some(MatchRef::new(3, 1)));
        assert!(losers_final.loss.is_none());

        let decider = find(&matches, 3, 1);
        assert!(decider.win.is_none());
    }

    #[test]
    fn five_players_surface_one_bye_match() {
        let matches = layout(5);
        assert_eq!(matches.len(), 8);
        assert_eq!(round_len(&matches, 1), 1);
        assert_eq!(round_len(&matches, 2), 2);

        // Seed 4 was spliced out against its mirror, seed 5.
        let bye = find(&matches, 1, 1);
        assert_eq!(bye.player1, Some(4));
        assert_eq!(bye.player2, Some(5));
        assert_eq!(bye.win, Some(MatchRef::new(2, 1)));

        // The vacated slot is exactly where the bye win-links back to.
        let vacated = find(&matches, 2, 1);
        assert_eq!(vacated.player1, Some(1));
        assert_eq!(vacated.player2, None);

        let untouched = find(&matches, 2, 2);
        assert_eq!(untouched.player1, Some(2));
        assert_eq!(untouched.player2, Some(3));
    }

    #[test]
    fn eight_players_have_no_bye_round() {
        let matches = layout(8);
        assert_eq!(matches.len(), 14);
        assert_eq!(round_len(&matches, 1), 4);
        assert_eq!(round_len(&matches, 2), 2);
        // Winners final after exactly three winners rounds, decider after it.
        assert_eq!(round_len(&matches, 3), 1);
        assert_eq!(find(&matches, 3, 1).win, Some(MatchRef::new(4, 1)));
        assert!(find(&matches, 4, 1).win.is_none());
        // Winners final loser drops into the losers final.
        assert_eq!(find(&matches, 3, 1).loss, Some(MatchRef::new(8, 1)));
        assert_eq!(find(&matches, 8, 1).win, Some(MatchRef::new(4, 1)));
    }

    #[test]
    fn eight_player_first_round_uses_fair_seeding() {
        let matches = layout(8);
        let pairs: Vec<(Option<u32>, Option<u32>)> = (1..=4)
            .map(|m| {
                let slot = find(&matches, 1, m);
                (slot.player1, slot.player2)
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Some(1), Some(8)),
                (Some(4), Some(5)),
                (Some(2), Some(7)),
                (Some(3), Some(6)),
            ]
        );
    }

    #[test]
    fn six_players_divert_every_first_round_loser_to_the_prefill_round() {
        // remainder equals half the round: both first-round matches are
        // bye-fed, so both losers pair against bye losers in the pre-fill
        // round and the minor round holds the two pre-fill winners.
        let matches = layout(6);
        assert_eq!(matches.len(), 10);
        assert_eq!(round_len(&matches, 5), 2);
        let losses: Vec<MatchRef> = (1..=2)
            .map(|m| find(&matches, 2, m).loss.unwrap())
            .collect();
        assert!(losses.iter().all(|l| l.round == 5));
        assert_ne!(losses[0].number, losses[1].number);
        assert_eq!(find(&matches, 5, 1).win, Some(MatchRef::new(6, 1)));
        assert_eq!(find(&matches, 5, 2).win, Some(MatchRef::new(6, 1)));
    }

    #[test]
    fn seven_players_split_the_prefill_stage() {
        let matches = layout(7);
        assert_eq!(matches.len(), 12);
        // remainder 3 exceeds half the round: pre-fill rounds of 1 and 2.
        assert_eq!(round_len(&matches, 1), 3);
        assert_eq!(round_len(&matches, 5), 1);
        assert_eq!(round_len(&matches, 6), 2);
        // The fully vacated slot's two byes both drop into the first
        // pre-fill match, whose winner advances into the second stage.
        let prefill = find(&matches, 5, 1);
        assert_eq!(prefill.win, Some(MatchRef::new(6, 2)));
        let feeders: Vec<u32> = (1..=3)
            .filter(|&m| find(&matches, 1, m).loss == Some(MatchRef::new(5, 1)))
            .collect();
        assert_eq!(feeders.len(), 2);
    }

    #[test]
    fn starting_round_offsets_every_round() {
        let matches = generate(8, &BracketOptions { starting_round: 3 }).unwrap();
        let min = matches.iter().map(|m| m.round).min().unwrap();
        let max = matches.iter().map(|m| m.round).max().unwrap();
        assert_eq!(min, 3);
        assert_eq!(max, 10);
        assert_eq!(find(&matches, 5, 1).win, Some(MatchRef::new(6, 1)));
    }

    #[test]
    fn generation_is_deterministic() {
        for n in [2, 3, 5, 6, 8, 13, 32] {
            assert_eq!(layout(n), layout(n));
        }
    }

    #[test]
    fn ordered_players_keep_their_seed_positions() {
        let players = ["alice", "bob", "carol", "dave", "erin"];
        let matches = generate_ordered(&players, &BracketOptions::default()).unwrap();
        let bye = matches
            .iter()
            .find(|m| m.round == 1 && m.number == 1)
            .unwrap();
        assert_eq!(bye.player1, Some("dave"));
        assert_eq!(bye.player2, Some("erin"));
        let top = matches
            .iter()
            .find(|m| m.round == 2 && m.number == 1)
            .unwrap();
        assert_eq!(top.player1, Some("alice"));
    }

    #[test]
    fn unordered_players_are_permuted_but_structure_is_unchanged() {
        let players = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let mut shuffle = SeededShuffle::new(99);
        let shuffled =
            generate_unordered(&players, &BracketOptions::default(), &mut shuffle).unwrap();
        let ordered = generate_ordered(&players, &BracketOptions::default()).unwrap();
        // Same skeleton and pointers.
        for (a, b) in shuffled.iter().zip(ordered.iter()) {
            assert_eq!((a.round, a.number, a.win, a.loss), (b.round, b.number, b.win, b.loss));
        }
        // Same players overall, assigned once each.
        let mut seen: Vec<&str> = shuffled
            .iter()
            .filter(|m| m.round == 1)
            .flat_map(|m| [m.player1, m.player2])
            .flatten()
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, players.to_vec());
    }
}
