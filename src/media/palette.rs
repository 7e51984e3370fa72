//! Dominant-color extraction (§4.4): resize to 100x100, run k-means,
//! then snap each cluster to the nearest of the 216 web-safe triples.
//! Ported from `media_processor.py`'s `_analyze_colors`, using a
//! manual k-means loop since nothing in the crate's stack brings a
//! clustering library along for the ride.

use crate::core::types::{DominantColor, WebSafeBucket};
use image::{imageops::FilterType, RgbImage};

const RESIZE_DIM: u32 = 100;
const MAX_ITERATIONS: usize = 20;

/// Sorted clusters (largest membership first), each rounded to 2 decimals.
pub fn dominant_colors(image: &RgbImage, k: usize) -> Vec<DominantColor> {
    if k == 0 {
        return Vec::new();
    }
    let resized = image::imageops::resize(image, RESIZE_DIM, RESIZE_DIM, FilterType::Triangle);
    let pixels: Vec<[f64; 3]> =
        resized.pixels().map(|p| [p[0] as f64, p[1] as f64, p[2] as f64]).collect();

    if pixels.is_empty() {
        return Vec::new();
    }

    let k = k.min(pixels.len());
    let mut centroids = seed_centroids(&pixels, k);
    let mut assignments = vec![0usize; pixels.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, pixel) in pixels.iter().enumerate() {
            let nearest = nearest_centroid(pixel, &centroids);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (pixel, &cluster) in pixels.iter().zip(assignments.iter()) {
            for c in 0..3 {
                sums[cluster][c] += pixel[c];
            }
            counts[cluster] += 1;
        }
        for cluster in 0..k {
            if counts[cluster] > 0 {
                for c in 0..3 {
                    centroids[cluster][c] = sums[cluster][c] / counts[cluster] as f64;
                }
            }
        }

        if !changed {
            break;
        }
    }

    let mut counts = vec![0usize; k];
    for &cluster in &assignments {
        counts[cluster] += 1;
    }
    let total = pixels.len() as f64;

    let mut clusters: Vec<DominantColor> = centroids
        .iter()
        .zip(counts.iter())
        .filter(|(_, &count)| count > 0)
        .map(|(centroid, &count)| DominantColor {
            rgb: (centroid[0].round() as u8, centroid[1].round() as u8, centroid[2].round() as u8),
            percentage: (count as f64 / total * 100.0 * 100.0).round() / 100.0,
        })
        .collect();

    clusters.sort_by(|a, b| b.percentage.partial_cmp(&a.percentage).unwrap());
    clusters
}

fn seed_centroids(pixels: &[[f64; 3]], k: usize) -> Vec<[f64; 3]> {
    let stride = pixels.len() / k;
    (0..k).map(|i| pixels[(i * stride).min(pixels.len() - 1)]).collect()
}

fn nearest_centroid(pixel: &[f64; 3], centroids: &[[f64; 3]]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| squared_distance(pixel, a).partial_cmp(&squared_distance(pixel, b)).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (0..3).map(|i| (a[i] - b[i]).powi(2)).sum()
}

fn web_safe_palette() -> Vec<(u8, u8, u8)> {
    const LEVELS: [u8; 6] = [0, 51, 102, 153, 204, 255];
    let mut out = Vec::with_capacity(216);
    for r in LEVELS {
        for g in LEVELS {
            for b in LEVELS {
                out.push((r, g, b));
            }
        }
    }
    out
}

fn rgb_distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let da = a.0 as i32 - b.0 as i32;
    let db = a.1 as i32 - b.1 as i32;
    let dc = a.2 as i32 - b.2 as i32;
    da * da + db * db + dc * dc
}

fn nearest_web_safe(rgb: (u8, u8, u8)) -> (u8, u8, u8) {
    web_safe_palette()
        .into_iter()
        .min_by_key(|&candidate| rgb_distance(rgb, candidate))
        .unwrap_or((0, 0, 0))
}

/// Snap each dominant color to the nearest web-safe triple and
/// aggregate percentages per hex bucket.
pub fn web_safe_histogram(colors: &[DominantColor]) -> Vec<WebSafeBucket> {
    let mut buckets: Vec<(String, f64)> = Vec::new();
    for color in colors {
        let (r, g, b) = nearest_web_safe(color.rgb);
        let hex = format!("#{:02x}{:02x}{:02x}", r, g, b);
        if let Some(existing) = buckets.iter_mut().find(|(h, _)| *h == hex) {
            existing.1 += color.percentage;
        } else {
            buckets.push((hex, color.percentage));
        }
    }
    buckets
        .into_iter()
        .map(|(hex, percentage)| WebSafeBucket { hex, percentage: (percentage * 100.0).round() / 100.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid_image(color: (u8, u8, u8)) -> RgbImage {
        RgbImage::from_fn(20, 20, |_, _| Rgb([color.0, color.1, color.2]))
    }

    #[test]
    fn a_solid_color_image_yields_one_dominant_cluster() {
        let img = solid_image((200, 10, 10));
        let colors = dominant_colors(&img, 3);
        assert_eq!(colors.len(), 1);
        assert!((colors[0].percentage - 100.0).abs() < 0.01);
    }

    #[test]
    fn web_safe_histogram_aggregates_equal_hex_buckets() {
        let colors = vec![
            DominantColor { rgb: (2, 2, 2), percentage: 60.0 },
            DominantColor { rgb: (1, 1, 1), percentage: 40.0 },
        ];
        let hist = web_safe_histogram(&colors);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].hex, "#000000");
        assert!((hist[0].percentage - 100.0).abs() < 0.01);
    }
}
