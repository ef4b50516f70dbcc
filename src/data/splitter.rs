// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles examples with a SEEDED generator and splits them into
// a training set and a held-out validation set.
//
// The seed is what makes training reproducible: the same seed
// gives the same split, and (with `shuffle_in_place`) the same
// per-epoch example order, so the model follows the same path.
//
// Uses Fisher-Yates via rand::seq::SliceRandom on a StdRng.
//
// Reference: rand crate documentation (SeedableRng)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// `validation_fraction` of 0.2 holds out 20%. At least one sample
/// always stays in the training set when there is one to give.
pub fn split_train_val<T>(
    mut samples:         Vec<T>,
    validation_fraction: f64,
    seed:                u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let fraction = validation_fraction.clamp(0.0, 1.0);
    let val_len  = ((total as f64) * fraction).round() as usize;
    let val_len  = val_len.min(total.saturating_sub(1));

    let val = samples.split_off(total - val_len);

    tracing::debug!(
        "Dataset split: {} training, {} validation (seed {})",
        samples.len(),
        val.len(),
        seed,
    );

    (samples, val)
}

/// Per-epoch shuffle driven by a caller-owned generator.
pub fn shuffle_in_place<T>(items: &mut [T], rng: &mut StdRng) {
    items.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val)      = split_train_val(items, 0.3, 7);
        let mut all: Vec<usize> = train.into_iter().chain(val).collect();
        all.sort();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_val((0..30).collect::<Vec<usize>>(), 0.2, 1234);
        let b = split_train_val((0..30).collect::<Vec<usize>>(), 0.2, 1234);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, val) = split_train_val(Vec::<usize>::new(), 0.2, 42);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_training_set_never_emptied() {
        let (train, val) = split_train_val(vec![1, 2, 3], 1.0, 42);
        assert_eq!(train.len(), 1);
        assert_eq!(val.len(), 2);
    }

    #[test]
    fn test_zero_fraction_keeps_everything() {
        let (train, val) = split_train_val((0..3).collect::<Vec<usize>>(), 0.0, 42);
        assert_eq!(train.len(), 3);
        assert!(val.is_empty());
    }
}
