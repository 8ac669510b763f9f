//! Parsing for the `cpulist` format used throughout the Linux virtual
//! filesystem for lists of processor and NUMA node identifiers.
//!
//! A cpulist is a comma-separated list of zero or more items, each either a
//! single integer (`5`), an inclusive range (`2-4`) or an inclusive range
//! with a stride (`0-10:2`, equivalent to `0,2,4,6,8,10`). Duplicates
//! collapse; the parsed result is in ascending order.

use itertools::Itertools;
use thiserror::Error;

pub(crate) type Item = u32;

/// A string did not conform to the cpulist grammar.
#[derive(Debug, Error)]
#[error("invalid cpulist syntax: '{invalid_value}': {problem}")]
pub(crate) struct ListingError {
    invalid_value: String,
    problem: &'static str,
}

impl ListingError {
    fn new(invalid_value: &str, problem: &'static str) -> Self {
        Self {
            invalid_value: invalid_value.to_string(),
            problem,
        }
    }
}

/// Parses a cpulist and returns the items in ascending order, removing
/// duplicates.
///
/// An empty (or all-whitespace) string is valid input and yields an empty
/// result.
pub(crate) fn parse(listing: &str) -> Result<Vec<Item>, ListingError> {
    let mut items = Vec::new();

    for part in listing.trim().split(',') {
        if part.is_empty() {
            continue;
        }

        parse_part(part, &mut items)?;
    }

    Ok(items.into_iter().sorted_unstable().dedup().collect())
}

fn parse_part(part: &str, items: &mut Vec<Item>) -> Result<(), ListingError> {
    let Some((start, rest)) = part.split_once('-') else {
        items.push(parse_item(part)?);
        return Ok(());
    };

    let start = parse_item(start)?;

    // A range end may carry a stride suffix; without one the stride is 1.
    let (end, stride) = match rest.split_once(':') {
        Some((end, stride)) => (parse_item(end)?, parse_item(stride)?),
        None => (parse_item(rest)?, 1),
    };

    if stride == 0 {
        return Err(ListingError::new(part, "range stride must not be zero"));
    }

    if start > end {
        return Err(ListingError::new(part, "range start must be <= end"));
    }

    items.extend((start..=end).step_by(stride as usize));

    Ok(())
}

fn parse_item(item: &str) -> Result<Item, ListingError> {
    item.parse::<Item>()
        .map_err(|_| ListingError::new(item, "could not be parsed as an integer"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parse_smoke_test() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("3").unwrap(), vec![3]);
        assert_eq!(parse("0-3,5,7-8").unwrap(), vec![0, 1, 2, 3, 5, 7, 8]);
        assert_eq!(parse("2,3,1").unwrap(), vec![1, 2, 3]);

        // Overlapping ranges collapse.
        assert_eq!(parse("0-5,1-6").unwrap(), vec![0, 1, 2, 3, 4, 5, 6]);

        // Trailing newline from a sysfs read is tolerated.
        assert_eq!(parse("0-1\n").unwrap(), vec![0, 1]);
    }

    #[test]
    fn parse_with_stride() {
        assert_eq!(parse("0-10:2").unwrap(), vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(parse("0-0:5").unwrap(), vec![0]);
        assert_eq!(parse("0-10:999999").unwrap(), vec![0]);
    }

    #[test]
    fn zero_stride_is_error() {
        parse("1-22:0").unwrap_err();
    }

    #[test]
    fn reversed_range_is_error() {
        parse("2-1").unwrap_err();
    }

    #[test]
    fn garbage_is_error() {
        parse("foo").unwrap_err();
        parse("123-foo").unwrap_err();
        parse("foo-123").unwrap_err();
        parse("123-456:foo").unwrap_err();
        parse("1,foo").unwrap_err();
    }
}
