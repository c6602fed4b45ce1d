//! Promotion of the next candidate after the active provider leaves.

/// Progress of an election over an ordered candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionState {
    /// Attempting to activate the candidate at this index
    Trying(usize),
    /// The candidate at this index activated
    Active(usize),
    /// Every candidate failed, or there were none
    Empty,
}

/// Outcome of [`elect`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Election {
    pub active: Option<usize>,
    /// Indexes that failed to activate. Always a prefix `0..n` of the list.
    pub failed: Vec<usize>,
}

/// Try candidates in order until one activates or the list is exhausted.
///
/// `try_activate` reports whether activation succeeded; the candidates
/// themselves are left in place for the caller to prune.
pub fn elect<T, F>(candidates: &mut [T], mut try_activate: F) -> Election
where
    F: FnMut(&mut T) -> bool,
{
    let mut failed = Vec::new();
    let mut state = if candidates.is_empty() {
        ElectionState::Empty
    } else {
        ElectionState::Trying(0)
    };
    loop {
        state = match state {
            ElectionState::Trying(i) => {
                if try_activate(&mut candidates[i]) {
                    ElectionState::Active(i)
                } else {
                    failed.push(i);
                    if i + 1 < candidates.len() {
                        ElectionState::Trying(i + 1)
                    } else {
                        ElectionState::Empty
                    }
                }
            }
            ElectionState::Active(i) => {
                return Election {
                    active: Some(i),
                    failed,
                }
            }
            ElectionState::Empty => return Election { active: None, failed },
        };
    }
}
