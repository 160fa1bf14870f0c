//! Legal-move generation over rank buckets.
//!
//! Candidates are assembled from per-rank counts, never from card subsets.
//! Each (shape, ranks) choice yields one canonical card set built from the
//! lowest-sorted cards of every bucket it draws from.

use std::collections::{BTreeMap, HashSet};

use super::cards_logic::{rank_buckets, sorted};
use super::cards_types::{Card, Rank};
use super::combo::{classify, Combo, ComboKind};
use super::rules::{Four2Policy, MIN_PAIR_SEQUENCE, MIN_PLANE, MIN_STRAIGHT};

struct Buckets {
    cards: BTreeMap<Rank, Vec<Card>>,
    /// Usable count per rank index; quads may be withheld when following.
    avail: [usize; Rank::COUNT],
}

impl Buckets {
    fn new(hand: &[Card], withhold_quads: bool) -> Self {
        let cards = rank_buckets(hand);
        let mut avail = [0usize; Rank::COUNT];
        for (rank, bucket) in &cards {
            let n = bucket.len();
            avail[rank.index()] = if withhold_quads && n == 4 { 0 } else { n };
        }
        Buckets { cards, avail }
    }

    fn take(&self, rank: Rank, n: usize, out: &mut Vec<Card>) {
        if let Some(bucket) = self.cards.get(&rank) {
            out.extend(bucket.iter().take(n).copied());
        }
    }

    /// Lowest cards of each bucket, `counts[rank]` of them.
    fn materialize(&self, counts: &[usize; Rank::COUNT]) -> Vec<Card> {
        let mut out = Vec::with_capacity(counts.iter().sum());
        for r in Rank::ALL {
            self.take(r, counts[r.index()], &mut out);
        }
        out
    }

    fn ranks_with(&self, n: usize) -> Vec<Rank> {
        Rank::ALL
            .into_iter()
            .filter(|r| self.avail[r.index()] >= n)
            .collect()
    }

    fn quads(&self) -> Vec<Rank> {
        self.cards
            .iter()
            .filter(|(_, b)| b.len() == 4)
            .map(|(r, _)| *r)
            .collect()
    }

    /// Start ranks of every `len`-long sequenceable run with `width` cards per rank.
    fn runs(&self, width: usize, len: usize) -> Vec<Rank> {
        let top = Rank::Ace.index();
        if len == 0 || len > top + 1 {
            return Vec::new();
        }
        (0..=top + 1 - len)
            .filter(|&s| (s..s + len).all(|i| self.avail[i] >= width))
            .filter_map(Rank::from_index)
            .collect()
    }

    /// Longest run with `width` cards per rank, used to bound run lengths when leading.
    fn max_run(&self, width: usize) -> usize {
        let mut best = 0;
        let mut cur = 0;
        for i in 0..=Rank::Ace.index() {
            if self.avail[i] >= width {
                cur += 1;
                best = best.max(cur);
            } else {
                cur = 0;
            }
        }
        best
    }
}

/// Per-rank attachment counts: `k` units of `width` cards drawn from `spare`.
/// A rank may supply several units when its spare count allows.
fn attachments(spare: &[usize; Rank::COUNT], width: usize, k: usize) -> Vec<[usize; Rank::COUNT]> {
    fn go(
        spare: &[usize; Rank::COUNT],
        width: usize,
        left: usize,
        i: usize,
        cur: &mut [usize; Rank::COUNT],
        out: &mut Vec<[usize; Rank::COUNT]>,
    ) {
        if left == 0 {
            out.push(*cur);
            return;
        }
        if i == Rank::COUNT {
            return;
        }
        for units in 0..=(spare[i] / width).min(left) {
            cur[i] = units * width;
            go(spare, width, left - units, i + 1, cur, out);
        }
        cur[i] = 0;
    }
    let mut out = Vec::new();
    if width > 0 {
        go(spare, width, k, 0, &mut [0; Rank::COUNT], &mut out);
    }
    out
}

fn rank_run(start: Rank, len: usize) -> Vec<Rank> {
    (start.index()..start.index() + len)
        .filter_map(Rank::from_index)
        .collect()
}

struct Collector<'a> {
    req: Option<&'a Combo>,
    policy: Four2Policy,
    seen: HashSet<Vec<Card>>,
    out: Vec<Vec<Card>>,
}

impl Collector<'_> {
    fn offer(&mut self, cards: Vec<Card>, expect: ComboKind) {
        let cards = sorted(&cards);
        let Some(combo) = classify(&cards, self.policy) else {
            return;
        };
        if combo.kind != expect {
            return;
        }
        if let Some(req) = self.req {
            if !combo.beats(req) {
                return;
            }
        }
        if self.seen.insert(cards.clone()) {
            self.out.push(cards);
        }
    }
}

fn units(b: &Buckets, c: &mut Collector<'_>, width: usize, kind: ComboKind) {
    for r in b.ranks_with(width) {
        let mut cards = Vec::with_capacity(width);
        b.take(r, width, &mut cards);
        c.offer(cards, kind);
    }
}

fn triple_with(b: &Buckets, c: &mut Collector<'_>, kicker_width: usize, kind: ComboKind) {
    for t in b.ranks_with(3) {
        for k in b.ranks_with(kicker_width) {
            if k == t {
                continue;
            }
            let mut cards = Vec::with_capacity(3 + kicker_width);
            b.take(t, 3, &mut cards);
            b.take(k, kicker_width, &mut cards);
            c.offer(cards, kind);
        }
    }
}

fn sequences(b: &Buckets, c: &mut Collector<'_>, width: usize, lens: &[usize], kind: ComboKind) {
    for &len in lens {
        for start in b.runs(width, len) {
            let mut cards = Vec::with_capacity(width * len);
            for r in rank_run(start, len) {
                b.take(r, width, &mut cards);
            }
            c.offer(cards, kind);
        }
    }
}

fn planes_with(b: &Buckets, c: &mut Collector<'_>, kicker_width: usize, lens: &[usize], kind: ComboKind) {
    let total: usize = b.avail.iter().sum();
    for &len in lens {
        if len * (3 + kicker_width) > total {
            continue;
        }
        for start in b.runs(3, len) {
            let mut body = [0usize; Rank::COUNT];
            for r in rank_run(start, len) {
                body[r.index()] = 3;
            }
            let mut spare = b.avail;
            for (s, used) in spare.iter_mut().zip(body) {
                *s -= used;
            }
            for wings in attachments(&spare, kicker_width, len) {
                let mut counts = body;
                for (n, w) in counts.iter_mut().zip(wings) {
                    *n += w;
                }
                c.offer(b.materialize(&counts), kind);
            }
        }
    }
}

fn four_with(b: &Buckets, c: &mut Collector<'_>, kicker_width: usize, kind: ComboKind) {
    for q in b.quads() {
        let mut spare = b.avail;
        spare[q.index()] = 0;
        for wings in attachments(&spare, kicker_width, 2) {
            let mut counts = wings;
            counts[q.index()] = 4;
            c.offer(b.materialize(&counts), kind);
        }
    }
}

fn bombs_and_rocket(b: &Buckets, c: &mut Collector<'_>) {
    for q in b.quads() {
        let mut cards = Vec::with_capacity(4);
        b.take(q, 4, &mut cards);
        c.offer(cards, ComboKind::Bomb);
    }
    if b.cards.contains_key(&Rank::SmallJoker) && b.cards.contains_key(&Rank::BigJoker) {
        c.offer(vec![Card::SMALL_JOKER, Card::BIG_JOKER], ComboKind::Rocket);
    }
}

fn lens_from(min: usize, max: usize) -> Vec<usize> {
    (min..=max).collect()
}

fn shape(b: &Buckets, c: &mut Collector<'_>, kind: ComboKind, lens: &[usize]) {
    match kind {
        ComboKind::Single => units(b, c, 1, kind),
        ComboKind::Pair => units(b, c, 2, kind),
        ComboKind::Triple => units(b, c, 3, kind),
        ComboKind::TripleSingle => triple_with(b, c, 1, kind),
        ComboKind::TriplePair => triple_with(b, c, 2, kind),
        ComboKind::Straight => sequences(b, c, 1, lens, kind),
        ComboKind::PairSequence => sequences(b, c, 2, lens, kind),
        ComboKind::Plane => sequences(b, c, 3, lens, kind),
        ComboKind::PlaneSingles => planes_with(b, c, 1, lens, kind),
        ComboKind::PlanePairs => planes_with(b, c, 2, lens, kind),
        ComboKind::FourTwoSingles => four_with(b, c, 1, kind),
        ComboKind::FourTwoPairs => four_with(b, c, 2, kind),
        ComboKind::Bomb | ComboKind::Rocket => bombs_and_rocket(b, c),
    }
}

/// Every legal card set `hand` can play: any combo when leading, otherwise
/// same-shape combos beating `requirement` plus overriding bombs and the rocket.
pub fn generate_moves(
    hand: &[Card],
    requirement: Option<&Combo>,
    policy: Four2Policy,
) -> Vec<Vec<Card>> {
    let withhold_quads = requirement.is_some_and(|r| !r.is_bomb_like());
    let mut c = Collector {
        req: requirement,
        policy,
        seen: HashSet::new(),
        out: Vec::new(),
    };

    match requirement {
        None => {
            let b = Buckets::new(hand, false);
            let straight = lens_from(MIN_STRAIGHT, b.max_run(1));
            let pair_seq = lens_from(MIN_PAIR_SEQUENCE, b.max_run(2));
            let plane = lens_from(MIN_PLANE, b.max_run(3));
            for kind in [
                ComboKind::Single,
                ComboKind::Pair,
                ComboKind::Triple,
                ComboKind::TripleSingle,
                ComboKind::TriplePair,
            ] {
                shape(&b, &mut c, kind, &[]);
            }
            shape(&b, &mut c, ComboKind::Straight, &straight);
            shape(&b, &mut c, ComboKind::PairSequence, &pair_seq);
            shape(&b, &mut c, ComboKind::Plane, &plane);
            shape(&b, &mut c, ComboKind::PlaneSingles, &plane);
            shape(&b, &mut c, ComboKind::PlanePairs, &plane);
            shape(&b, &mut c, ComboKind::FourTwoSingles, &[]);
            shape(&b, &mut c, ComboKind::FourTwoPairs, &[]);
            bombs_and_rocket(&b, &mut c);
        }
        Some(req) => {
            let b = Buckets::new(hand, withhold_quads);
            let run_len = match req.kind {
                ComboKind::Straight => req.len,
                ComboKind::PairSequence => req.len / 2,
                ComboKind::Plane => req.len / 3,
                ComboKind::PlaneSingles => req.len / 4,
                ComboKind::PlanePairs => req.len / 5,
                _ => 0,
            };
            if !req.is_bomb_like() {
                shape(&b, &mut c, req.kind, &[run_len]);
            }
            // Bombs always come from the full hand.
            let full = Buckets::new(hand, false);
            bombs_and_rocket(&full, &mut c);
        }
    }
    c.out
}
