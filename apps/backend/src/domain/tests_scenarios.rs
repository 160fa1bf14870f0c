//! End-to-end rule scenarios across combo, move generation and trick flow.

use crate::domain::dealing::deal;
use crate::domain::tricks::{legal_actions, pass, play};
use crate::domain::{classify, generate_moves, try_parse_cards, Card, Four2Policy, MatchState};

fn c(tokens: &[&str]) -> Vec<Card> {
    try_parse_cards(tokens).unwrap()
}

fn playing(landlord: u8, hands: [Vec<Card>; 3]) -> MatchState {
    let mut s = MatchState::new(deal(Some(42)), Four2Policy::Both);
    s.start_bidding().unwrap();
    s.set_landlord(landlord).unwrap();
    s.reveal(false).unwrap();
    s.hands = hands;
    s
}

#[test]
fn leading_triple_hand_offers_units_and_triple_single() {
    let s = playing(0, [c(&["3S", "3H", "3D", "4S"]), c(&["9S"]), c(&["9H"])]);
    let actions = legal_actions(&s, 0);
    assert!(!actions.can_pass);
    for expected in [
        c(&["3S", "3H", "3D"]),
        c(&["3S", "3H", "3D", "4S"]),
        c(&["3S"]),
        c(&["4S"]),
        c(&["3S", "3H"]),
    ] {
        assert!(actions.plays.contains(&expected), "missing {expected:?}");
    }
}

#[test]
fn pair_of_fives_against_sevens_and_nines_bomb() {
    let mut s = playing(
        0,
        [
            c(&["5S", "5H", "KD"]),
            c(&["7S", "7H", "9S", "9H", "9D", "9C"]),
            c(&["3H", "4H"]),
        ],
    );
    play(&mut s, 0, &c(&["5S", "5H"])).unwrap();
    let actions = legal_actions(&s, 1);
    assert!(actions.can_pass);
    assert_eq!(
        actions.plays,
        vec![c(&["7S", "7H"]), c(&["9S", "9H", "9D", "9C"])]
    );
}

#[test]
fn unbeatable_requirement_leaves_pass_and_overrides() {
    let mut s = playing(
        0,
        [
            c(&["2S", "2H", "KD"]),
            c(&["3S", "4S", "5S", "5H"]),
            c(&["3H", "4H"]),
        ],
    );
    play(&mut s, 0, &c(&["2S", "2H"])).unwrap();
    let actions = legal_actions(&s, 1);
    assert!(actions.plays.is_empty());
    assert!(actions.can_pass);
}

#[test]
fn trick_returns_to_player_after_all_pass() {
    let mut s = playing(
        1,
        [c(&["3S", "4S"]), c(&["8S", "8H", "JD"]), c(&["3H", "4H"])],
    );
    play(&mut s, 1, &c(&["8S", "8H"])).unwrap();
    pass(&mut s, 2).unwrap();
    pass(&mut s, 0).unwrap();
    assert_eq!(s.turn, 1);
    assert!(s.requirement.is_none());
    assert_eq!(s.passes, 0);
    assert!(!legal_actions(&s, 1).can_pass);
}

#[test]
fn spring_doubles_relative_to_plain_win() {
    let mut sprung = playing(
        0,
        [
            c(&["5S", "5H", "KD"]),
            c(&["3S", "4S", "6S"]),
            c(&["3H", "4H", "7H"]),
        ],
    );
    play(&mut sprung, 0, &c(&["5S", "5H"])).unwrap();
    pass(&mut sprung, 1).unwrap();
    pass(&mut sprung, 2).unwrap();
    play(&mut sprung, 0, &c(&["KD"])).unwrap();

    let mut plain = playing(
        0,
        [
            c(&["5S", "5H", "KD"]),
            c(&["3S", "6S", "6H", "8S"]),
            c(&["3H", "4H", "7H"]),
        ],
    );
    play(&mut plain, 0, &c(&["5S", "5H"])).unwrap();
    play(&mut plain, 1, &c(&["6S", "6H"])).unwrap();
    pass(&mut plain, 2).unwrap();
    pass(&mut plain, 0).unwrap();
    play(&mut plain, 1, &c(&["3S"])).unwrap();
    pass(&mut plain, 2).unwrap();
    play(&mut plain, 0, &c(&["KD"])).unwrap();
    assert_eq!(plain.hands[1], c(&["8S"]));

    assert_eq!(sprung.winner, Some(0));
    assert_eq!(plain.winner, Some(0));
    assert!(sprung.multiplier.spring);
    assert!(!plain.multiplier.spring);
    assert_eq!(sprung.multiplier.total(), 2 * plain.multiplier.total());
}

#[test]
fn rocket_follows_anything_and_bomb_needs_higher_bomb() {
    let policy = Four2Policy::Both;
    let hand = c(&["SJ", "BJ", "6S", "6H", "6D", "6C"]);
    let bomb = classify(&c(&["9S", "9H", "9D", "9C"]), policy).unwrap();
    assert_eq!(generate_moves(&hand, Some(&bomb), policy), vec![c(&["SJ", "BJ"])]);

    let straight = classify(&c(&["3S", "4H", "5D", "6C", "7S"]), policy).unwrap();
    let moves = generate_moves(&hand, Some(&straight), policy);
    assert!(moves.contains(&c(&["6S", "6H", "6D", "6C"])));
    assert!(moves.contains(&c(&["SJ", "BJ"])));
    assert_eq!(moves.len(), 2);
}
