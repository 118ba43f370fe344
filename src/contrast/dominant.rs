//! Dominant colour of an image region.
//!
//! Pixels are bucketed by the top four bits of each channel. The most
//! populated bucket wins (ties go to the bucket seen first) and its mean
//! colour is returned, so anti-aliased text edges inside a crop do not pull
//! the result away from the flat background.

use std::collections::HashMap;

use image::RgbImage;

use crate::pdf::Rgb;

#[derive(Default)]
struct Bucket {
    count: u64,
    sum: [u64; 3],
    first_seen: usize,
}

/// Returns the dominant colour of `image`, or `None` if it has no pixels.
#[must_use]
pub fn dominant_color(image: &RgbImage) -> Option<Rgb> {
    let mut buckets: HashMap<[u8; 3], Bucket> = HashMap::new();

    for (position, pixel) in image.pixels().enumerate() {
        let key = pixel.0.map(|c| c >> 4);
        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            first_seen: position,
            ..Bucket::default()
        });
        bucket.count += 1;
        for (sum, channel) in bucket.sum.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel);
        }
    }

    let winner = buckets.into_values().max_by(|a, b| {
        a.count
            .cmp(&b.count)
            .then_with(|| b.first_seen.cmp(&a.first_seen))
    })?;

    let mean = winner.sum.map(|sum| {
        let value = (sum + winner.count / 2) / winner.count;
        u8::try_from(value).unwrap_or(u8::MAX)
    });
    Some(Rgb(mean))
}
