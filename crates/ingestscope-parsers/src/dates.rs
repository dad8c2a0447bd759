//! Precedence-ranked selection among competing date candidates.
//!
//! Publisher feeds often carry several dates that could fill the same field
//! (first online, final form, accepted...). Candidates are ranked by tier and
//! the choice is made before the field is written, so document order never
//! lets a weaker candidate replace a stronger one.

/// Tiers for the electronic publication date, strongest first.
pub const ELECTRONIC_DATE_TIERS: &[&str] = &[
    "firstOnline",
    "publishedOnlineFinalForm",
    "publishedOnlineAccepted",
];

#[derive(Debug, Clone)]
pub struct DateReconciler<'t> {
    tiers: &'t [&'t str],
    best: Option<(usize, String)>,
}

impl<'t> DateReconciler<'t> {
    pub fn new(tiers: &'t [&'t str]) -> Self {
        Self { tiers, best: None }
    }

    /// Rank of `kind`, 0 being the strongest. Unranked kinds are ignored.
    pub fn tier_of(&self, kind: &str) -> Option<usize> {
        self.tiers.iter().position(|tier| *tier == kind)
    }

    /// Offer one candidate. Within a tier the later candidate wins; a
    /// stronger tier already chosen is never replaced.
    /// Returns whether the candidate is now the current choice.
    pub fn offer(&mut self, kind: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let Some(tier) = self.tier_of(kind) else {
            return false;
        };
        if matches!(&self.best, Some((best, _)) if *best < tier) {
            return false;
        }
        self.best = Some((tier, value.to_string()));
        true
    }

    pub fn resolve(self) -> Option<String> {
        self.best.map(|(_, value)| value)
    }
}

/// Pad a partial ISO date to `YYYY-MM-DD`, using `00` for a missing month
/// or day.
pub fn pad_partial_date(raw: &str) -> Option<String> {
    let mut parts = raw.trim().split('-').filter(|p| !p.is_empty());
    let year = parts.next()?;
    let month = parts.next().unwrap_or("00");
    let day = parts.next().unwrap_or("00");
    Some(format!("{year}-{month:0>2}-{day:0>2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconcile(candidates: &[(&str, &str)]) -> Option<String> {
        let mut dates = DateReconciler::new(ELECTRONIC_DATE_TIERS);
        for (kind, value) in candidates {
            dates.offer(kind, value);
        }
        dates.resolve()
    }

    #[test]
    fn strongest_tier_wins_regardless_of_order() {
        let forward = [
            ("firstOnline", "2020-01-01"),
            ("publishedOnlineFinalForm", "2020-02-01"),
            ("publishedOnlineAccepted", "2019-12-01"),
        ];
        let mut backward = forward;
        backward.reverse();
        assert_eq!(reconcile(&forward).as_deref(), Some("2020-01-01"));
        assert_eq!(reconcile(&backward).as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn falls_back_to_lower_tiers() {
        let picked = reconcile(&[
            ("publishedOnlineAccepted", "2019-12-01"),
            ("publishedOnlineFinalForm", "2020-02-01"),
        ]);
        assert_eq!(picked.as_deref(), Some("2020-02-01"));
        assert_eq!(
            reconcile(&[("publishedOnlineAccepted", "2019-12-01")]).as_deref(),
            Some("2019-12-01")
        );
    }

    #[test]
    fn later_candidate_wins_within_a_tier() {
        let picked = reconcile(&[("firstOnline", "2020-01-01"), ("firstOnline", "2020-01-05")]);
        assert_eq!(picked.as_deref(), Some("2020-01-05"));
    }

    #[test]
    fn unranked_and_blank_candidates_are_ignored() {
        let mut dates = DateReconciler::new(ELECTRONIC_DATE_TIERS);
        assert!(!dates.offer("manuscriptReceived", "2019-01-01"));
        assert!(!dates.offer("firstOnline", "  "));
        assert_eq!(dates.resolve(), None);
    }

    #[test]
    fn pads_partial_dates() {
        assert_eq!(pad_partial_date("2019").as_deref(), Some("2019-00-00"));
        assert_eq!(pad_partial_date("2019-05").as_deref(), Some("2019-05-00"));
        assert_eq!(pad_partial_date("2019-05-17").as_deref(), Some("2019-05-17"));
        assert_eq!(pad_partial_date(""), None);
    }
}
