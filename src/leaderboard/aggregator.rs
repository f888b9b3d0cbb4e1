use super::models::{MatchResult, Stats};
use crate::tft::Unit;

/// Sum of tier times rarity over every unit on a board
pub fn board_value(units: &[Unit]) -> u64 {
    units.iter().map(Unit::value).sum()
}

/// Reduces a player's results into summary stats.
///
/// Placements are summed as a float and divided once at the end; an empty
/// list yields zeroed stats with an average finish of zero.
pub fn aggregate(results: &[MatchResult]) -> Stats {
    let mut stats = Stats::default();
    let mut finishes = 0f64;

    for result in results {
        let participant = &result.participant;

        stats.damage_dealt += u64::from(participant.total_damage_to_players);
        stats.players_eliminated += u64::from(participant.players_eliminated);
        stats.board_value += board_value(&participant.units);
        finishes += f64::from(participant.placement);

        // First place and anything below fifth both count as a top finish.
        match participant.placement {
            1 => {
                stats.top_finishes += 1;
                stats.wins += 1;
            }
            place if place > 5 => stats.top_finishes += 1,
            _ => {}
        }
    }

    stats.games = results.len();
    if stats.games > 0 {
        stats.average_finish = finishes / stats.games as f64;
    }

    stats
}
