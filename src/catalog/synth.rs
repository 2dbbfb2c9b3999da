//! Placeholder rating distributions and reviews for products that lack them.
//!
//! Nothing here is real customer data. Output keeps a fixed shape (mostly
//! positive, recent-ish) and is reproducible when driven by a seeded RNG.

use crate::catalog::models::{RatingDistribution, Review};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Upper bound on synthesized reviews per product.
pub const MAX_REVIEWS: usize = 6;

/// Lower bound on synthesized reviews per product.
const MIN_REVIEWS: usize = 3;

/// Reviews are backdated at most this many days.
const MAX_AGE_DAYS: i64 = 115;

const REVIEW_POOL: &[(&str, &str)] = &[
    ("Aarav S.", "Exactly as described. Packaging was neat and delivery was quick."),
    ("Meera K.", "Great quality for the price, I have already ordered a second one."),
    ("Daniel R.", "Fits well and feels premium. Would recommend to friends."),
    ("Priya N.", "Colour is slightly different from the photos but still lovely."),
    ("Lucas M.", "Solid build. Been using it daily for a few weeks with no issues."),
    ("Sofia L.", "Arrived a day early. Really happy with this purchase."),
    ("Rohan P.", "Good value. Customer support answered my question within hours."),
    ("Emma W.", "Looks even better in person. Five stars from me."),
    ("Kabir D.", "Does the job well. Minor scuff on the box but product was fine."),
    ("Hannah T.", "Comfortable and stylish, my new favourite."),
];

/// Builds a star distribution whose buckets sum to `count`.
///
/// Stars 5, 4 and 3 take fixed shares chosen by the average rate; the
/// remainder goes 60/40 to stars 2 and 1.
pub fn rating_distribution(rate: f32, count: u32) -> RatingDistribution {
    let (five, four, three) = if rate >= 4.5 {
        (0.70, 0.20, 0.05)
    } else if rate >= 4.0 {
        (0.50, 0.30, 0.10)
    } else {
        (0.30, 0.30, 0.20)
    };

    let total = f64::from(count);
    let s5 = (total * five).floor() as i64;
    let s4 = (total * four).floor() as i64;
    let s3 = (total * three).floor() as i64;

    let rest = i64::from(count) - s5 - s4 - s3;
    let s2 = (rest as f64 * 0.6).floor() as i64;
    let s1 = rest - s2;

    let clamp = |n: i64| u32::try_from(n.max(0)).unwrap_or(0);

    RatingDistribution { buckets: [clamp(s1), clamp(s2), clamp(s3), clamp(s4), clamp(s5)] }
}

/// Draws 3-6 distinct canned reviews rated 4 or 5, dated within the last
/// ~115 days before `now`, newest first.
pub fn synthesize_reviews<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<Review> {
    let wanted = rng.random_range(MIN_REVIEWS..=MAX_REVIEWS).min(REVIEW_POOL.len());

    // Partial Fisher-Yates over pool indices
    let mut order: Vec<usize> = (0..REVIEW_POOL.len()).collect();
    for i in 0..wanted {
        let j = rng.random_range(i..order.len());
        order.swap(i, j);
    }

    let mut reviews: Vec<Review> = order
        .iter()
        .take(wanted)
        .filter_map(|&idx| REVIEW_POOL.get(idx))
        .map(|(name, text)| {
            let days = rng.random_range(0..=MAX_AGE_DAYS);
            let hours = rng.random_range(0..24);
            Review {
                reviewer: (*name).to_string(),
                rating: rng.random_range(4..=5),
                comment: (*text).to_string(),
                date: now - Duration::days(days) - Duration::hours(hours),
            }
        })
        .collect();

    reviews.sort_by(|a, b| b.date.cmp(&a.date));
    reviews
}
