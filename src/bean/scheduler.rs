//! SM-2 spaced repetition update.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing the answer, remembered
//! - 2: Incorrect, but the answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! The order of the steps matters: the ease factor is updated before the
//! interval, and interval growth multiplies the *previous* interval by the
//! already clamped ease factor. A grade of 3 counts as a success for the
//! attempt counter but still schedules the card for the same day.

use chrono::{DateTime, Duration, Utc};

use crate::model::{Card, Quality, MIN_EFACTOR};

/// Grades below this reset the consecutive-success counter.
const PASSING_QUALITY: u8 = 3;
/// Grades below this keep the card due the same day.
const SPACING_QUALITY: u8 = 4;
/// Upper bound for `days_interval`, roughly a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Computes the next state of `card` after a review graded `quality` at `now`.
pub fn update(card: &Card, quality: Quality, now: DateTime<Utc>) -> Card {
    let q = quality.value();
    let mut next = card.clone();
    next.quality = q;

    if q < PASSING_QUALITY {
        next.attempt = 0;
    } else {
        next.attempt += 1;
        next.efactor = ease_after(next.efactor, q).max(MIN_EFACTOR);
    }

    next.days_interval = if q < SPACING_QUALITY {
        0
    } else {
        match next.attempt {
            1 => 1,
            2 => 6,
            _ => grown_interval(card.days_interval, next.efactor),
        }
    };

    next.next_rehearsal = now
        .checked_add_signed(Duration::days(i64::from(next.days_interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    next
}

fn grown_interval(days: u32, efactor: f64) -> u32 {
    let grown = (f64::from(days) * efactor).round();
    if grown >= f64::from(MAX_INTERVAL_DAYS) {
        MAX_INTERVAL_DAYS
    } else {
        grown as u32
    }
}

// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
fn ease_after(efactor: f64, quality: u8) -> f64 {
    let miss = f64::from(5 - quality);
    efactor + (0.1 - miss * (0.08 + miss * 0.02))
}
