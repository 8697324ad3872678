//! Shortest distinguishing prefixes for precursor category labels.
//!
//! Sequences are grouped by their first characters; any group that is still
//! ambiguous is split again one character deeper. Members of a group that
//! share an identical sequence keep a short prefix and are told apart by
//! their charge and isotope label suffixes instead.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::category::PrecursorCategory;

pub const MIN_PREFIX_LEN: usize = 3;

/// Drops bracketed modification annotations and lower-cases the residue each
/// one was attached to, e.g. `PEPC[+57]TIDE` becomes `PEPcTIDE`.
pub fn casing_source(modified_sequence: &str) -> String {
    let mut result = String::with_capacity(modified_sequence.len());
    let mut depth = 0usize;

    for c in modified_sequence.chars() {
        match c {
            '[' => {
                if depth == 0 {
                    if let Some(residue) = result.pop() {
                        result.extend(residue.to_lowercase());
                    }
                }
                depth += 1;
            }
            ']' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            _ => result.push(c),
        }
    }

    result
}

fn take_chars(sequence: &str, len: usize) -> String {
    sequence.chars().take(len).collect()
}

fn assign_group(
    sequences: &[String],
    members: &[usize],
    prefix_len: usize,
    out: &mut [String],
) {
    let Some(&first) = members.first() else {
        return;
    };

    let identical = members
        .iter()
        .all(|&member| sequences[member] == sequences[first]);
    if members.len() == 1 || identical {
        let keep = MIN_PREFIX_LEN.max(prefix_len - 1);
        for &member in members {
            out[member] = take_chars(&sequences[member], keep);
        }
        return;
    }

    let mut buckets: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for &member in members {
        buckets
            .entry(take_chars(&sequences[member], prefix_len))
            .or_default()
            .push(member);
    }

    for (prefix, bucket) in buckets {
        if bucket.len() > 1 {
            assign_group(sequences, &bucket, prefix_len + 1, out);
        } else {
            out[bucket[0]] = prefix;
        }
    }
}

/// Returns one prefix per sequence, unique among distinct sequences.
pub fn unique_prefixes(sequences: &[String]) -> Vec<String> {
    let mut out = vec![String::new(); sequences.len()];
    let members: Vec<usize> = (0..sequences.len()).collect();
    assign_group(sequences, &members, MIN_PREFIX_LEN, &mut out);
    out
}

/// Sets display prefixes and suffix flags on a chart's peptide categories.
///
/// The charge is hidden when a (sequence, isotope label) pair occurs with a
/// single charge; the isotope label is hidden when a sequence occurs with a
/// single label.
pub fn assign_peptide_labels(categories: &mut [&mut PrecursorCategory]) {
    let sequences: Vec<String> = categories
        .iter()
        .map(|category| casing_source(&category.sequence))
        .collect();
    let prefixes = unique_prefixes(&sequences);

    let mut charges: HashMap<(&str, i64), HashSet<u32>> = HashMap::new();
    let mut labels: HashMap<&str, HashSet<i64>> = HashMap::new();
    for (category, sequence) in categories.iter().zip(&sequences) {
        charges
            .entry((sequence.as_str(), category.isotope_label.id))
            .or_default()
            .insert(category.charge);
        labels
            .entry(sequence.as_str())
            .or_default()
            .insert(category.isotope_label.id);
    }

    for ((category, sequence), prefix) in categories.iter_mut().zip(&sequences).zip(prefixes) {
        category.show_charge = charges[&(sequence.as_str(), category.isotope_label.id)].len() > 1;
        category.show_label = labels[sequence.as_str()].len() > 1;
        category.display_prefix = Some(prefix);
    }
}

/// Molecules keep their full ion name; only the suffix policy applies.
pub fn assign_molecule_labels(categories: &mut [&mut PrecursorCategory]) {
    let mut charges: HashMap<(String, i64), HashSet<u32>> = HashMap::new();
    let mut labels: HashMap<String, HashSet<i64>> = HashMap::new();
    for category in categories.iter() {
        charges
            .entry((category.sequence.clone(), category.isotope_label.id))
            .or_default()
            .insert(category.charge);
        labels
            .entry(category.sequence.clone())
            .or_default()
            .insert(category.isotope_label.id);
    }

    for category in categories.iter_mut() {
        let key = (category.sequence.clone(), category.isotope_label.id);
        category.show_charge = charges[&key].len() > 1;
        category.show_label = labels[&category.sequence].len() > 1;
        category.display_prefix = None;
    }
}
