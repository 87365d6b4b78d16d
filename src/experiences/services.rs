use uuid::Uuid;

/// Per-user vote toggle: removes the voter when present, adds them when not.
/// Returns the voter's new membership state. The counter always tracks the
/// set size.
pub fn apply_vote(upvoted_by: &mut Vec<Uuid>, voter: Uuid) -> bool {
    if let Some(pos) = upvoted_by.iter().position(|id| *id == voter) {
        upvoted_by.remove(pos);
        false
    } else {
        upvoted_by.push(voter);
        true
    }
}

/// Percentile-range shorthand used by the listing filter.
pub fn min_percentile(range: Option<&str>) -> Option<f64> {
    range.map(|r| match r {
        "99" => 99.0,
        "98" => 98.0,
        "95" => 95.0,
        _ => 90.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vote_adds_membership() {
        let voter = Uuid::new_v4();
        let mut voters = vec![Uuid::new_v4()];
        assert!(apply_vote(&mut voters, voter));
        assert_eq!(voters.len(), 2);
        assert!(voters.contains(&voter));
    }

    #[test]
    fn double_toggle_restores_original_state() {
        let voter = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut voters = vec![other];

        assert!(apply_vote(&mut voters, voter));
        assert!(!apply_vote(&mut voters, voter));
        assert_eq!(voters, vec![other]);
    }

    #[test]
    fn toggle_only_affects_the_voter() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut voters = vec![a, b];
        apply_vote(&mut voters, a);
        assert_eq!(voters, vec![b]);
    }

    #[test]
    fn percentile_ranges_map_to_thresholds() {
        assert_eq!(min_percentile(Some("99")), Some(99.0));
        assert_eq!(min_percentile(Some("98")), Some(98.0));
        assert_eq!(min_percentile(Some("95")), Some(95.0));
        assert_eq!(min_percentile(Some("90")), Some(90.0));
        assert_eq!(min_percentile(Some("anything")), Some(90.0));
        assert_eq!(min_percentile(None), None);
    }
}
