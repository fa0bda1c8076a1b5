// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::commands::arg;
use crate::models::Category;
use crate::utils::maybe_print_json;

/// Checked in order; the first category with a keyword contained in the
/// description wins.
static KEYWORDS: Lazy<Vec<(Category, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (
            Category::Food,
            &[
                "makan", "resto", "cafe", "kopi", "food", "makanan", "grabfood", "gofood",
                "warteg", "nasi", "mie",
            ][..],
        ),
        (
            Category::Transport,
            &[
                "grab", "gojek", "taxi", "bensin", "parkir", "tol", "transport", "ojek", "bus",
                "kereta",
            ][..],
        ),
        (
            Category::Bills,
            &[
                "listrik", "pln", "air", "pdam", "internet", "wifi", "telepon", "pulsa", "tagihan",
            ][..],
        ),
        (
            Category::Shopping,
            &[
                "shopee", "tokopedia", "lazada", "bukalapak", "belanja", "beli", "mall", "toko",
            ][..],
        ),
        (
            Category::Entertainment,
            &["netflix", "spotify", "game", "bioskop", "cinema", "nonton", "hiburan"][..],
        ),
        (
            Category::Health,
            &["apotek", "dokter", "rs", "rumah sakit", "obat", "kesehatan", "medical"][..],
        ),
        (
            Category::Education,
            &["kursus", "buku", "sekolah", "kuliah", "les", "pendidikan", "course"][..],
        ),
        (
            Category::Subscription,
            &["subscription", "langganan", "membership", "premium"][..],
        ),
        (Category::Salary, &["gaji", "salary", "payroll"][..]),
        (Category::Freelance, &["freelance", "project", "proyek", "fee"][..]),
        (
            Category::Investment,
            &["dividen", "dividend", "bunga", "interest", "investasi"][..],
        ),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub category: Category,
    pub confidence: Confidence,
}

pub fn suggest(description: &str) -> Suggestion {
    let text = description.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(category, _)| Suggestion {
            category: *category,
            confidence: Confidence::High,
        })
        .unwrap_or(Suggestion {
            category: Category::OtherExpense,
            confidence: Confidence::Low,
        })
}

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let s = suggest(arg(m, "text")?);
    if !maybe_print_json(m.get_flag("json"), false, &s)? {
        let confidence = match s.confidence {
            Confidence::High => "high",
            Confidence::Low => "low",
        };
        println!("{} ({} confidence)", s.category, confidence);
    }
    Ok(())
}
