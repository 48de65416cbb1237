use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut shortened = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_label_keeps_short_text() {
        assert_eq!(truncate_label("APP-1", 8), "APP-1");
        assert_eq!(truncate_label("Refactor parser", 8), "Refacto…");
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x, y) = stable_pair("APP-42");
        assert_eq!((x, y), stable_pair("APP-42"));
        assert!((-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y));
    }
}
