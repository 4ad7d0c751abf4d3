//! Decides whether a free-text filming location belongs to a place.

/// "Does `location` mention `place`?"
pub trait LocationMatcher {
    fn matches(&self, location: &str, place: &str) -> bool;
}

/// Case-sensitive substring test. Coarse: "Georgia" matches both the
/// country and the US state, "Rome" matches "Rome, Georgia, USA".
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl LocationMatcher for SubstringMatcher {
    fn matches(&self, location: &str, place: &str) -> bool {
        !place.is_empty() && location.contains(place)
    }
}

/// Stricter matcher: `place` must appear as one of the comma-separated
/// components of the location (after trimming).
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentMatcher;

impl LocationMatcher for ComponentMatcher {
    fn matches(&self, location: &str, place: &str) -> bool {
        let place = place.trim();
        !place.is_empty() && location.split(',').any(|part| part.trim() == place)
    }
}

/// First candidate that `matcher` finds in `location`.
pub fn first_match<'c, M, S>(matcher: &M, location: &str, candidates: &'c [S]) -> Option<&'c str>
where
    M: LocationMatcher + ?Sized,
    S: AsRef<str>,
{
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|place| matcher.matches(location, place))
}
