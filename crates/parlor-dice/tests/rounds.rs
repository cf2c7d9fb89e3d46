//! Integration tests for whole rounds and whole games at the dice table.

use parlor_dice::{
    Bid, BidDecision, CallProgress, DiceError, DicePlayer, DiceTable, Hand, Persona, Phase,
    SeatId, coerce_bid, fallback_decision,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn seat(id: &str) -> SeatId {
    SeatId::from(id)
}

/// Two local seats whose hands are dealt from a fixed script.
fn scripted_pair(first: [u8; 5], second: [u8; 5]) -> DiceTable {
    let mut table = DiceTable::new(vec![
        DicePlayer::local("p1", "One"),
        DicePlayer::local("p2", "Two"),
    ])
    .unwrap();
    let mut hands = vec![first.to_vec(), second.to_vec()].into_iter();
    table
        .start_round_with(|_| hands.next().unwrap_or_default())
        .unwrap();
    table
}

// =========================================================================
// Bid scenarios
// =========================================================================

#[test]
fn test_ten_dice_exact_claim_caller_loses() {
    // Five wilds and five 6s: all ten count toward "ten 6s".
    let mut table = scripted_pair([1, 1, 1, 1, 1], [6, 6, 6, 6, 6]);
    table.place_bid(&seat("p1"), Bid::new(10, 6)).unwrap();

    let CallProgress::Resolved(result) = table.call(&seat("p2")).unwrap() else {
        panic!("all hands are local");
    };
    assert_eq!(result.count, 10);
    assert!(!result.call_succeeded());
    assert_eq!(result.loser, seat("p2"));
    assert_eq!(table.player(&seat("p2")).unwrap().dice_count(), 4);
}

#[test]
fn test_repeated_bid_rejected() {
    let mut table = scripted_pair([2; 5], [3; 5]);
    table.place_bid(&seat("p1"), Bid::new(3, 4)).unwrap();

    let err = table.place_bid(&seat("p2"), Bid::new(3, 4)).unwrap_err();
    assert_eq!(
        err,
        DiceError::BidTooLow {
            bid: Bid::new(3, 4),
            current: Bid::new(3, 4)
        }
    );
}

#[test]
fn test_lower_face_rejected_higher_quantity_accepted() {
    let mut table = scripted_pair([2; 5], [3; 5]);
    table.place_bid(&seat("p1"), Bid::new(3, 4)).unwrap();

    assert!(matches!(
        table.place_bid(&seat("p2"), Bid::new(3, 2)),
        Err(DiceError::BidTooLow { .. })
    ));
    // The rejection left p2 on turn, so the better bid still goes through.
    table.place_bid(&seat("p2"), Bid::new(4, 1)).unwrap();
    assert_eq!(table.current_bid().unwrap().bid, Bid::new(4, 1));
    assert_eq!(table.current_bid().unwrap().owner, seat("p2"));
}

// =========================================================================
// Two peers
// =========================================================================

/// The host's and the guest's view of the same online game.
fn mirrored_tables() -> (DiceTable, DiceTable) {
    let host = DiceTable::new(vec![
        DicePlayer::local("host", "Host"),
        DicePlayer::remote("guest", "Guest"),
    ])
    .unwrap();
    let guest = DiceTable::new(vec![
        DicePlayer::remote("host", "Host"),
        DicePlayer::local("guest", "Guest"),
    ])
    .unwrap();
    (host, guest)
}

#[test]
fn test_mirrored_tables_settle_identically_in_either_reveal_order() {
    let host_dice = vec![2, 2, 5, 1, 3];
    let guest_dice = vec![6, 2, 4, 4, 1];

    let (mut host, mut guest) = mirrored_tables();
    host.start_round_with(|_| host_dice.clone()).unwrap();
    guest.start_round_with(|_| guest_dice.clone()).unwrap();

    // Host opens, guest calls. Every action is applied on both tables.
    for table in [&mut host, &mut guest] {
        table.place_bid(&seat("host"), Bid::new(5, 2)).unwrap();
        assert_eq!(
            table.call(&seat("guest")).unwrap(),
            CallProgress::AwaitingReveal
        );
    }

    // Each side learns the other's hand.
    let CallProgress::Resolved(on_host) = host.reveal(&seat("guest"), guest_dice.clone()).unwrap()
    else {
        panic!("host now knows both hands");
    };
    let CallProgress::Resolved(on_guest) = guest.reveal(&seat("host"), host_dice.clone()).unwrap()
    else {
        panic!("guest now knows both hands");
    };

    // 2,2,1 from the host and 2,1 from the guest: five, so the bid holds.
    assert_eq!(on_host.count, 5);
    assert_eq!(on_host.count, on_guest.count);
    assert_eq!(on_host.loser, on_guest.loser);
    assert_eq!(on_host.loser, seat("guest"));
    for (a, b) in host.players().iter().zip(guest.players()) {
        assert_eq!(a.dice_count(), b.dice_count());
    }
    assert_eq!(host.phase(), guest.phase());
}

#[test]
fn test_remote_hand_hidden_again_next_round() {
    let (mut host, _) = mirrored_tables();
    host.start_round_with(|n| vec![3; n]).unwrap();
    host.place_bid(&seat("host"), Bid::new(1, 3)).unwrap();
    host.call(&seat("guest")).unwrap();
    host.reveal(&seat("guest"), vec![4; 5]).unwrap();

    host.start_round_with(|n| vec![3; n]).unwrap();
    assert_eq!(host.player(&seat("guest")).unwrap().hand(), &Hand::Hidden);
}

// =========================================================================
// Whole games
// =========================================================================

/// Plays a seeded offline game to the end with every seat on the fallback
/// heuristic, checking invariants after each settled call.
fn play_out(seed: u64, seats: usize) -> DiceTable {
    let mut players = vec![DicePlayer::local("me", "Me")];
    for (i, persona) in Persona::ROSTER.iter().take(seats - 1).enumerate() {
        players.push(DicePlayer::ai(format!("ai-{i}"), *persona));
    }
    let mut table = DiceTable::new(players).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..10_000 {
        match table.phase().clone() {
            Phase::GameOver { .. } => return table,
            Phase::RoundOver => table.start_round(&mut rng).unwrap(),
            Phase::AwaitingReveal { .. } => panic!("offline hands are always known"),
            Phase::AwaitingBid => {
                let active = table.active_player().unwrap().clone();
                let hand = active.hand().dice().unwrap().to_vec();
                let current = table.current_bid().map(|t| t.bid);
                let before = table.total_dice();

                match fallback_decision(&hand, table.total_dice(), current.as_ref()) {
                    BidDecision::Call if current.is_some() => {
                        table.call(&active.id).unwrap();
                        assert_eq!(table.total_dice(), before - 1);
                    }
                    BidDecision::Call => unreachable!("fallback never calls an empty table"),
                    BidDecision::Bid(bid) => {
                        let bid = coerce_bid(bid, current.as_ref());
                        table.place_bid(&active.id, bid).unwrap();
                    }
                }
            }
        }
    }
    panic!("game did not finish");
}

#[test]
fn test_seeded_games_finish_with_one_survivor() {
    for seed in 0..20 {
        for seats in 2..=4 {
            let table = play_out(seed, seats);
            let survivors: Vec<_> = table.players().iter().filter(|p| !p.is_out()).collect();
            assert_eq!(survivors.len(), 1, "seed {seed}, {seats} seats");
            assert_eq!(table.winner(), Some(&survivors[0].id));
        }
    }
}
