//! Soft dataset checks. Nothing here affects the pass/fail verdict.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::config::ValidatorConfig;
use crate::schema::Hash32;

#[derive(Clone, Debug, Serialize)]
pub struct QualityReport {
    #[serde(with = "hex", rename = "dataset_hash_hex")]
    pub dataset_hash: Hash32,    // BLAKE3(line + "\n" for every line)
    pub records: u64,            // records that reached the end of the record pass
    pub duplicate_records: u64,
    pub duplicate_rate: f32,     // 0.0..1.0
    pub records_without_system: u64,
    pub warnings: Vec<String>,
}

impl QualityReport {
    pub fn dataset_hash_hex(&self) -> String {
        hex::encode(self.dataset_hash)
    }
}

/// Accumulates fingerprints while the validator walks a file.
pub(crate) struct QualityTracker {
    hasher: blake3::Hasher,
    seen: HashSet<Hash32>,
    records: u64,
    dupes: u64,
    without_system: u64,
}

impl QualityTracker {
    pub(crate) fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
            seen: HashSet::new(),
            records: 0,
            dupes: 0,
            without_system: 0,
        }
    }

    pub(crate) fn observe_line(&mut self, line: &str) {
        // exact content + newline => stable hash across reads
        self.hasher.update(line.as_bytes());
        self.hasher.update(b"\n");
    }

    /// `messages` is the raw `messages` array of a counted record.
    pub(crate) fn observe_record(&mut self, messages: &JsonValue, has_system: bool) {
        self.records += 1;
        if !has_system {
            self.without_system += 1;
        }
        let fp = fingerprint(messages);
        if !self.seen.insert(fp) {
            self.dupes += 1;
        }
    }

    pub(crate) fn finish(self, config: &ValidatorConfig) -> QualityReport {
        let duplicate_rate = if self.records == 0 {
            0.0
        } else {
            self.dupes as f32 / self.records as f32
        };

        let mut warnings = Vec::new();
        if self.records > 0 && self.records < config.min_recommended_examples {
            warnings.push(format!(
                "Low example count ({}). Recommended: {}+",
                self.records, config.min_recommended_examples
            ));
        }
        if duplicate_rate > config.max_duplicate_rate {
            warnings.push(format!(
                "High duplicate_rate ({duplicate_rate:.2}). Consider deduping"
            ));
        }

        QualityReport {
            dataset_hash: self.hasher.finalize().into(),
            records: self.records,
            duplicate_records: self.dupes,
            duplicate_rate,
            records_without_system: self.without_system,
            warnings,
        }
    }
}

/// Hash of a JSON value with object keys visited in sorted order, so key
/// order in the file never affects the result whatever map type
/// `serde_json` was built with.
pub(crate) fn fingerprint(value: &JsonValue) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hash_canonical(value, &mut hasher);
    hasher.finalize().into()
}

fn hash_canonical(value: &JsonValue, hasher: &mut blake3::Hasher) {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            hasher.update(b"{");
            for k in keys {
                hash_atom(k, hasher);
                hash_canonical(&map[k.as_str()], hasher);
            }
            hasher.update(b"}");
        }
        JsonValue::Array(items) => {
            hasher.update(b"[");
            for item in items {
                hash_canonical(item, hasher);
            }
            hasher.update(b"]");
        }
        scalar => hash_atom(&scalar.to_string(), hasher),
    }
}

// length prefix keeps adjacent atoms from running together
fn hash_atom(s: &str, hasher: &mut blake3::Hasher) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
