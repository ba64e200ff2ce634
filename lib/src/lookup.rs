//! Fuzzy resolution of typed initials to players.

use crate::Player;
use itertools::Itertools;

/// Scores `pattern` as a case-insensitive subsequence of `candidate`.
///
/// Each matched character adds the length-weighted value of the run it extends
/// (`1`, then `3`, `7`, ... for adjacent matches), so contiguous matches beat
/// scattered ones. A candidate equal to the pattern outranks everything.
/// `None` when the pattern is not a subsequence.
pub fn score(pattern: &str, candidate: &str) -> Option<u64> {
    let pattern: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
    if pattern.iter().copied().eq(candidate.chars().flat_map(char::to_lowercase)) {
        return Some(u64::MAX);
    }
    let mut wanted = pattern.iter().peekable();
    let mut total: u64 = 0;
    let mut run: u64 = 0;

    for c in candidate.chars().flat_map(char::to_lowercase) {
        match wanted.peek() {
            Some(&&next) if next == c => {
                wanted.next();
                run = run.saturating_mul(2).saturating_add(1);
                total = total.saturating_add(run);
            }
            Some(_) => run = 0,
            None => break,
        }
    }

    wanted.peek().is_none().then_some(total)
}

/// Players whose initials fuzzily match `query`, best first.
///
/// Equal scores keep the order of `players`. Whitespace in the query is
/// ignored; a query with nothing left matches nobody.
pub fn lookup<'a, I>(query: &str, players: I) -> Vec<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    let pattern: String = query.chars().filter(|c| !c.is_whitespace()).collect();
    if pattern.is_empty() {
        return Vec::new();
    }

    let matches = players
        .into_iter()
        .filter_map(|player| score(&pattern, &player.initials).map(|score| (score, player)))
        .sorted_by(|(lhs, _), (rhs, _)| rhs.cmp(lhs))
        .map(|(_, player)| player)
        .collect_vec();
    log::trace!("lookup {:?}: {} match(es)", query, matches.len());
    matches
}
