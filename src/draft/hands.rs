//! Hand construction and pass-the-pack rotation.
//!
//! Hands stay at their seat for the whole draft. Participants move: each
//! round every participant's seat index advances by one, so the hand a
//! participant just picked from is viewed next by the previous seat's
//! occupant.

use super::error::{DraftError, DraftErrorKind};
use super::item::Item;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

/// Result of dealing a shuffled pool.
#[derive(Debug, Clone)]
pub struct Deal {
    /// Seat-indexed hands.
    pub hands: Vec<Vec<Item>>,
    /// Pool items that were never dealt.
    pub undealt: Vec<Item>,
}

/// Shuffles the pool and deals `hand_size` items to each of `seat_count` seats.
///
/// Item `i` of the shuffled pool goes to seat `i % seat_count`. Items past
/// `seat_count * hand_size` are returned as undealt.
///
/// # Errors
///
/// `InsufficientItems` if the pool cannot fill every hand.
#[instrument(skip(items, rng), fields(pool = items.len()))]
pub fn deal<R: Rng + ?Sized>(
    mut items: Vec<Item>,
    seat_count: usize,
    hand_size: usize,
    rng: &mut R,
) -> Result<Deal, DraftError> {
    let required = seat_count.checked_mul(hand_size).unwrap_or(usize::MAX);
    if required > items.len() {
        return Err(DraftErrorKind::InsufficientItems {
            required,
            available: items.len(),
        }
        .into());
    }

    items.shuffle(rng);
    let undealt = items.split_off(required);

    let mut hands: Vec<Vec<Item>> = (0..seat_count)
        .map(|_| Vec::with_capacity(hand_size))
        .collect();
    for (i, item) in items.into_iter().enumerate() {
        hands[i % seat_count].push(item);
    }

    debug!(seat_count, hand_size, undealt = undealt.len(), "Dealt hands");
    Ok(Deal { hands, undealt })
}

/// Which seat each participant currently views, indexed by roster position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatAssignment {
    seats: Vec<usize>,
}

impl SeatAssignment {
    /// Participant `i` sits at seat `i`.
    pub fn identity(seat_count: usize) -> Self {
        Self {
            seats: (0..seat_count).collect(),
        }
    }

    /// Seat viewed by the participant at roster position `ordinal`.
    pub fn seat_of(&self, ordinal: usize) -> Option<usize> {
        self.seats.get(ordinal).copied()
    }

    /// Number of seats.
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// True when nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Advances every participant by one seat, wrapping at the end.
    pub fn rotate(&self) -> Self {
        let count = self.len();
        Self {
            seats: self.seats.iter().map(|seat| (seat + 1) % count).collect(),
        }
    }

    /// True when every seat is held by exactly one participant.
    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.seats.len()];
        for &seat in &self.seats {
            match seen.get_mut(seat) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::named(format!("item-{i}"))).collect()
    }

    #[test]
    fn deal_fills_every_seat_and_keeps_remainder() {
        let mut rng = StdRng::seed_from_u64(7);
        let deal = deal(pool(11), 3, 3, &mut rng).expect("Enough items");
        assert_eq!(deal.hands.len(), 3);
        assert!(deal.hands.iter().all(|h| h.len() == 3));
        assert_eq!(deal.undealt.len(), 2);
    }

    #[test]
    fn deal_rejects_small_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = deal(pool(5), 3, 2, &mut rng).expect_err("Needs 6 items");
        assert_eq!(
            err.kind,
            DraftErrorKind::InsufficientItems {
                required: 6,
                available: 5
            }
        );
    }

    #[test]
    fn rotation_wraps() {
        let seats = SeatAssignment::identity(3).rotate();
        assert_eq!(seats.seat_of(0), Some(1));
        assert_eq!(seats.seat_of(2), Some(0));
        assert!(seats.is_bijection());
        assert_eq!(seats.len(), 3);
        assert!(!seats.is_empty());
    }

    #[test]
    fn deal_rejects_overflowing_hand_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = deal(pool(4), 2, usize::MAX / 2 + 1, &mut rng).expect_err("Cannot fill hands");
        assert_eq!(
            err.kind,
            DraftErrorKind::InsufficientItems {
                required: usize::MAX,
                available: 4
            }
        );
    }

    #[test]
    fn empty_assignment() {
        assert!(SeatAssignment::identity(0).is_empty());
    }
}
