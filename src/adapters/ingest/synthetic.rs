//! Deterministic demo data.

use serde_json::{json, Map, Value};

use crate::domain::{Dataset, Record};

pub const SYNTHETIC_HEADERS: [&str; 7] = [
    "customer_id",
    "primary_category",
    "spend_amount",
    "frequency",
    "last_purchase_days",
    "feedback_sentiment",
    "is_promo_user",
];

const CATEGORIES: [&str; 5] = ["Grocery", "Electronics", "Apparel", "Home", "Beauty"];
const SENTIMENTS: [&str; 3] = ["positive", "neutral", "negative"];

/// Generates `rows` shopper records. The same `rows` always yields the same data.
pub fn synthetic_dataset(rows: usize) -> Dataset {
    let headers = SYNTHETIC_HEADERS.iter().map(|h| h.to_string()).collect();
    let records = (0..rows).map(synthetic_record).collect();
    Dataset::new(headers, records)
}

fn synthetic_record(i: usize) -> Record {
    let spend = 20.0 + ((i * 37) % 480) as f64 + ((i * 13) % 100) as f64 / 100.0;

    let values: [Value; 7] = [
        json!(format!("CUST-{:04}", i + 1)),
        json!(CATEGORIES[(i * 7 + 3) % CATEGORIES.len()]),
        json!(spend),
        json!(1 + (i * 11) % 24),
        json!((i * 29) % 180),
        json!(SENTIMENTS[(i * 5) % SENTIMENTS.len()]),
        json!(i % 3 == 0),
    ];

    let mut record = Map::new();
    for (header, value) in SYNTHETIC_HEADERS.iter().zip(values) {
        record.insert(header.to_string(), value);
    }
    record
}
