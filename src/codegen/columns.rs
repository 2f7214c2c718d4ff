//! Column index expressions such as `0,2-4,6`.

use tracing::warn;

/// Largest column index accepted; wider than any spreadsheet.
pub const MAX_COLUMN_INDEX: usize = 16_384;

/// Parse comma-separated 0-based indices and inclusive ranges.
///
/// Ranges expand ascending in place; duplicates are kept. Malformed tokens
/// (non-integers, reversed ranges, indices above [`MAX_COLUMN_INDEX`]) are
/// dropped with a warning, so the result is always the well-formed part of
/// the input.
pub fn parse_column_indices(spec: &str) -> Vec<usize> {
    let compact: String = spec.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Vec::new();
    }

    let mut indices = Vec::new();
    for part in compact.split(',') {
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((start, end)) if !start.is_empty() => match (start.parse::<usize>(), end.parse::<usize>()) {
                (Ok(_), Ok(end)) if end > MAX_COLUMN_INDEX => warn!("Range too large: {}", part),
                (Ok(start), Ok(end)) if start <= end => indices.extend(start..=end),
                _ => warn!("Invalid range format: {}", part),
            },
            _ => match part.parse::<usize>() {
                Ok(idx) if idx <= MAX_COLUMN_INDEX => indices.push(idx),
                Ok(_) => warn!("Column index too large: {}", part),
                Err(_) => warn!("Invalid column index: {}", part),
            },
        }
    }
    indices
}

/// Comma form of an index list; parses back to the same list.
pub fn render_column_indices(indices: &[usize]) -> String {
    indices.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_indices_and_ranges() {
        assert_eq!(parse_column_indices("0,2-4,6"), vec![0, 2, 3, 4, 6]);
        assert_eq!(parse_column_indices("0-3"), vec![0, 1, 2, 3]);
        assert_eq!(parse_column_indices(" 1 , 1 "), vec![1, 1]);
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(parse_column_indices("").is_empty());
        assert!(parse_column_indices("   ").is_empty());
    }

    #[test]
    fn malformed_tokens_are_dropped() {
        assert!(parse_column_indices("3-1").is_empty());
        assert_eq!(parse_column_indices("a,2,x-3,4-5-6,7"), vec![2, 7]);
        assert_eq!(parse_column_indices("-1,0"), vec![0]);
        assert_eq!(parse_column_indices("1,,2"), vec![1, 2]);
    }

    #[test]
    fn oversized_ranges_are_dropped() {
        assert!(parse_column_indices("0-18446744073709551615").is_empty());
        assert!(parse_column_indices("0-30000000").is_empty());
        assert_eq!(parse_column_indices("1,0-30000000,2"), vec![1, 2]);
        assert_eq!(parse_column_indices("99999,3"), vec![3]);
        assert_eq!(parse_column_indices("16383-16384").len(), 2);
    }

    #[test]
    fn parse_is_idempotent_through_render() {
        for spec in ["0,2-4,6", "5", "1-1,0", "9,3-5,3", ""] {
            let once = parse_column_indices(spec);
            let twice = parse_column_indices(&render_column_indices(&once));
            assert_eq!(once, twice, "spec {:?}", spec);
        }
    }
}
