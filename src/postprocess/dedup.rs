// ============================================================
// Post-processing — Deduplication
// ============================================================
// One entity per (label, key), where the key is the lowercased
// normalized value. Names are already whitespace-collapsed at this
// point, so "Jane Doe" and "jane  doe" share a key.
//
// Which occurrence survives:
//   - a higher confidence beats a lower one
//   - any confidence beats no confidence
//   - otherwise the first occurrence in document order stays
//
// Input must already be in document order.

use std::collections::HashMap;

use crate::domain::annotation::Label;
use crate::domain::prediction::Entity;

fn outranks(challenger: Option<f32>, kept: Option<f32>) -> bool {
    match (challenger, kept) {
        (Some(c), Some(k)) => c > k,
        (Some(_), None)    => true,
        _                  => false,
    }
}

pub fn dedup_key(entity: &Entity) -> (Label, String) {
    (entity.label, entity.value.to_lowercase())
}

/// Deduplicated entities ordered by (start, label).
pub fn dedup(entities: Vec<Entity>) -> Vec<Entity> {
    let mut kept: Vec<Entity> = Vec::with_capacity(entities.len());
    let mut index: HashMap<(Label, String), usize> = HashMap::new();

    for entity in entities {
        let key = dedup_key(&entity);
        match index.get(&key) {
            Some(&slot) => {
                if outranks(entity.confidence, kept[slot].confidence) {
                    tracing::debug!("'{}' replaces an earlier lower-confidence match", entity.value);
                    kept[slot] = entity;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(entity);
            }
        }
    }

    kept.sort_by(|a, b| a.start.cmp(&b.start).then(a.label.cmp(&b.label)));
    kept
}
