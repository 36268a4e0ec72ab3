//! Camelot wheel notation
//!
//! The wheel places the 24 major and minor keys on 12 positions ordered by
//! the circle of fifths, which makes harmonic mixing easy to read:
//!
//! - Numbers 1-12 represent positions on the wheel
//! - 'A' suffix = minor key, 'B' suffix = major key
//! - Adjacent numbers are harmonically compatible (perfect fifth)
//! - Same number, different letter = relative major/minor

use crate::types::{Mode, PitchClass};

/// Wheel label per pitch class (0 = C), indexed by mode (0 = minor, 1 = major)
static WHEEL: [[&str; 2]; 12] = [
    ["5A", "8B"],   // C
    ["12A", "3B"],  // C# / Db
    ["7A", "10B"],  // D
    ["2A", "5B"],   // D# / Eb
    ["9A", "12B"],  // E
    ["4A", "7B"],   // F
    ["11A", "2B"],  // F# / Gb
    ["6A", "9B"],   // G
    ["1A", "4B"],   // G# / Ab
    ["8A", "11B"],  // A
    ["3A", "6B"],   // A# / Bb
    ["10A", "1B"],  // B
];

/// Labels in wheel order, minor before major at each position
static LABELS: [[&str; 2]; 12] = [
    ["1A", "1B"],
    ["2A", "2B"],
    ["3A", "3B"],
    ["4A", "4B"],
    ["5A", "5B"],
    ["6A", "6B"],
    ["7A", "7B"],
    ["8A", "8B"],
    ["9A", "9B"],
    ["10A", "10B"],
    ["11A", "11B"],
    ["12A", "12B"],
];

/// Map a numeric (pitch class, mode) pair onto the wheel
///
/// `pitch_class` is 0-11 starting at C, `mode` is 0 for minor and 1 for
/// major. Anything else has no label.
pub fn harmonic_label(pitch_class: i32, mode: i32) -> Option<&'static str> {
    let pc = usize::try_from(pitch_class).ok()?;
    let mode = usize::try_from(mode).ok()?;
    WHEEL.get(pc)?.get(mode).copied()
}

/// Typed form of [`harmonic_label`]; total over its domain
pub fn label_for(pitch: PitchClass, mode: Mode) -> &'static str {
    WHEEL[pitch.to_index() as usize][mode.to_index() as usize]
}

/// Get harmonically compatible keys (for mixing suggestions)
///
/// Returns keys that are safe to mix with the given key:
/// - Same key
/// - +1/-1 on the wheel (perfect fifth relationship)
/// - Same number, opposite letter (relative major/minor)
///
/// An unparseable label has no compatible keys.
pub fn compatible_labels(label: &str) -> Vec<&'static str> {
    let Some((number, letter)) = parse_label(label) else {
        return Vec::new();
    };

    // Wheel positions are 1-based; work 0-based and wrap 12 <-> 1
    let position = number - 1;
    let plus_one = (position + 1) % 12;
    let minus_one = (position + 11) % 12;

    vec![
        LABELS[position][letter],
        LABELS[plus_one][letter],
        LABELS[minus_one][letter],
        LABELS[position][1 - letter],
    ]
}

/// Split "8A" into (8, 0) and "12B" into (12, 1)
fn parse_label(label: &str) -> Option<(usize, usize)> {
    let label = label.trim();
    let letter = match label.chars().last()? {
        'A' | 'a' => 0,
        'B' | 'b' => 1,
        _ => return None,
    };
    let number: usize = label[..label.len() - 1].parse().ok()?;
    (1..=12).contains(&number).then_some((number, letter))
}
