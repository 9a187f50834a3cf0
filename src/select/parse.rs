// src/select/parse.rs
// =============================================================================
// Parses the operator's answer to "which files do you want?".
//
// Grammar (whitespace around tokens is ignored):
//   all                  -> every ID from 1 to max_id
//   3                    -> just ID 3
//   4-7                  -> IDs 4, 5, 6, 7 (both ends inclusive)
//   1-3, 8, 10-11        -> any comma-separated mix of the above
//   5-2                  -> nothing (a reversed range is empty)
//
// Validation is all-or-nothing: one bad token rejects the whole answer,
// so the operator never gets a half-applied selection.
//
// Order is preserved and duplicates are kept ("2,1-3" -> [2, 1, 2, 3]).
// =============================================================================

use crate::error::SelectionError;

// Parses a selection string into 1-based IDs
//
// Parameters:
//   input: what the operator typed
//   max_id: number of candidates on offer (IDs run 1..=max_id)
//
// Returns: Ok(ids) in the order given, or Err(reason) so the caller can
// print the reason and ask again
pub fn parse_selection(input: &str, max_id: usize) -> Result<Vec<usize>, SelectionError> {
    if max_id == 0 {
        return Err(SelectionError::NoCandidates);
    }

    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok((1..=max_id).collect());
    }

    let mut ids = Vec::new();

    for token in input.split(',') {
        let token = token.trim();

        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_id(start, token)?;
                let end = parse_id(end, token)?;

                if start < 1 || end > max_id || start > max_id || end < 1 {
                    return Err(SelectionError::RangeOutOfRange { start, end, max_id });
                }
                // A reversed range such as "5-2" selects nothing
                ids.extend(start..=end);
            }
            None => {
                let id = parse_id(token, token)?;

                if id < 1 || id > max_id {
                    return Err(SelectionError::IdOutOfRange { id, max_id });
                }

                ids.push(id);
            }
        }
    }

    Ok(ids)
}

// Parses one number; `token` is the whole comma-separated piece, for the
// error message
fn parse_id(s: &str, token: &str) -> Result<usize, SelectionError> {
    s.trim().parse::<usize>().map_err(|_| SelectionError::Malformed {
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_full_range() {
        for max_id in 1..=12 {
            let expected: Vec<usize> = (1..=max_id).collect();
            assert_eq!(parse_selection("all", max_id).unwrap(), expected);
        }
        assert_eq!(parse_selection("  ALL \n", 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mixed_ids_and_ranges_keep_order() {
        assert_eq!(parse_selection("2,4-6,9", 10).unwrap(), vec![2, 4, 5, 6, 9]);
        assert_eq!(parse_selection("1-3, 8", 10).unwrap(), vec![1, 2, 3, 8]);
        assert_eq!(parse_selection("9,1", 10).unwrap(), vec![9, 1]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(parse_selection("2,1-3", 5).unwrap(), vec![2, 1, 2, 3]);
    }

    #[test]
    fn test_single_id_range() {
        assert_eq!(parse_selection("4-4", 5).unwrap(), vec![4]);
    }

    #[test]
    fn test_bounds_violations() {
        assert_eq!(
            parse_selection("0,5", 10),
            Err(SelectionError::IdOutOfRange { id: 0, max_id: 10 })
        );
        assert_eq!(
            parse_selection("3-20", 10),
            Err(SelectionError::RangeOutOfRange { start: 3, end: 20, max_id: 10 })
        );
        assert!(parse_selection("11", 10).is_err());
        assert!(parse_selection("0-2", 10).is_err());
    }

    #[test]
    fn test_fail_closed_on_any_bad_token() {
        // Valid prefix does not leak through
        assert!(parse_selection("1,2,x", 5).is_err());
        assert!(parse_selection("1,2,99", 5).is_err());
    }

    #[test]
    fn test_non_numeric_tokens() {
        assert_eq!(
            parse_selection("a,b", 5),
            Err(SelectionError::Malformed { token: "a".to_string() })
        );
        assert!(parse_selection("", 5).is_err());
        assert!(parse_selection("1,", 5).is_err());
        assert!(parse_selection("-3", 5).is_err());
        assert!(parse_selection("1-2-3", 5).is_err());
        assert!(parse_selection("1.5", 5).is_err());
    }

    #[test]
    fn test_reversed_range_selects_nothing() {
        assert_eq!(parse_selection("1,5-2,3", 10), Ok(vec![1, 3]));
        assert_eq!(parse_selection("5-2", 10), Ok(vec![]));
        // Endpoints are still bounds-checked
        assert!(parse_selection("12-2", 10).is_err());
    }

    #[test]
    fn test_empty_candidate_list() {
        assert_eq!(parse_selection("all", 0), Err(SelectionError::NoCandidates));
    }
}
