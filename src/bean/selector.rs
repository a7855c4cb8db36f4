//! Due-card selection.
//!
//! A card is due once its next rehearsal is at or before `now`. Among due
//! cards the one with the earliest rehearsal wins; ties go to the smallest
//! key so the choice does not depend on store enumeration order.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::model::Card;

/// Picks the next card to review, or `None` when nothing is due.
pub fn next_due<'a, I>(cards: I, now: DateTime<Utc>) -> Option<&'a Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut best: Option<&Card> = None;
    for card in cards {
        if !card.is_due(now) {
            continue;
        }
        best = match best {
            Some(current) if due_order(current, card) != Ordering::Greater => Some(current),
            _ => Some(card),
        };
    }
    best
}

/// Number of cards due at `now`.
pub fn due_count<'a, I>(cards: I, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a Card>,
{
    cards.into_iter().filter(|card| card.is_due(now)).count()
}

/// Orders cards by rehearsal time, then key.
pub fn due_order(a: &Card, b: &Card) -> Ordering {
    a.next_rehearsal
        .cmp(&b.next_rehearsal)
        .then_with(|| a.key.cmp(&b.key))
}
