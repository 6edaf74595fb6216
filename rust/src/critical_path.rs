//! Critical path marking over an epic's placed tickets.
//!
//! Only the single heaviest chain is marked: start from the heaviest level-0 ticket
//! and keep stepping to the heaviest direct dependent. Ties go to the earlier ticket
//! in list order, and side branches are never marked even when equally heavy.

use rustc_hash::FxHashMap;

use crate::models::ScheduledTicket;

/// Dependents adjacency over placed tickets only, by position in `tickets`.
fn placed_dependents(tickets: &[ScheduledTicket]) -> Vec<Vec<usize>> {
    let mut position: FxHashMap<&str, usize> = FxHashMap::default();
    for (idx, t) in tickets.iter().enumerate() {
        position.entry(t.ticket.key.as_str()).or_insert(idx);
    }

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tickets.len()];
    for (idx, t) in tickets.iter().enumerate() {
        for blocker in &t.ticket.blocked_by {
            if let Some(&blocker_idx) = position.get(blocker.as_str()) {
                dependents[blocker_idx].push(idx);
            }
        }
    }
    dependents
}

/// Position of the heaviest ticket among `candidates`; the first one wins ties.
fn heaviest(tickets: &[ScheduledTicket], candidates: impl Iterator<Item = usize>) -> Option<usize> {
    candidates.fold(None, |best: Option<usize>, idx| match best {
        Some(b) if tickets[b].critical_path_weight >= tickets[idx].critical_path_weight => Some(b),
        _ => Some(idx),
    })
}

/// Positions on the heaviest dependency chain, in walk order.
pub fn critical_path(tickets: &[ScheduledTicket]) -> Vec<usize> {
    let dependents = placed_dependents(tickets);
    let roots = (0..tickets.len()).filter(|&idx| tickets[idx].parallel_group == 0);
    let Some(mut current) = heaviest(tickets, roots) else {
        return Vec::new();
    };

    let mut visited = vec![false; tickets.len()];
    let mut path = Vec::new();
    loop {
        visited[current] = true;
        path.push(current);
        let next = heaviest(
            tickets,
            dependents[current].iter().copied().filter(|&d| !visited[d]),
        );
        match next {
            Some(idx) => current = idx,
            None => break,
        }
    }
    path
}

/// Set `is_on_critical_path` on the heaviest chain.
pub fn mark_critical_path(tickets: &mut [ScheduledTicket]) {
    for idx in critical_path(tickets) {
        tickets[idx].is_on_critical_path = true;
    }
}
