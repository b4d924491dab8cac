//! Cover from squad-mates standing in front of the defender

use crate::combat::events::CoverContribution;
use crate::core::types::SquadId;
use crate::squads::{SquadRoster, Unit};

/// Units granting cover to `defender`, nearest row first
///
/// A provider stands in a strictly lower row of the same column, within its
/// cover range. Providers that require activity must be alive.
pub fn cover_providers<'a>(roster: &'a SquadRoster, squad: SquadId, defender: &Unit) -> Vec<&'a Unit> {
    let mut providers: Vec<&Unit> = roster
        .units_in_squad(squad)
        .filter(|u| u.id != defender.id)
        .filter(|u| match u.cover {
            Some(cover) => {
                u.slot.col == defender.slot.col
                    && u.slot.row < defender.slot.row
                    && defender.slot.row - u.slot.row <= cover.range
                    && cover.value > 0.0
                    && (!cover.requires_active || u.is_alive())
            }
            None => false,
        })
        .collect();
    providers.sort_by_key(|u| std::cmp::Reverse(u.slot.row));
    providers
}

/// Apply each provider to the damage still remaining after the previous one
///
/// The total absorbed never exceeds `max_cover` of the incoming damage.
pub fn apply_cover(damage: u32, providers: &[&Unit], max_cover: f32) -> (u32, Vec<CoverContribution>) {
    let budget = (damage as f32 * max_cover).floor() as u32;
    let mut remaining = damage;
    let mut absorbed = 0;
    let mut contributions = Vec::with_capacity(providers.len());

    for provider in providers {
        let Some(cover) = provider.cover else { continue };
        let reduction = ((remaining as f32 * cover.value).floor() as u32).min(budget - absorbed);
        remaining -= reduction;
        absorbed += reduction;
        contributions.push(CoverContribution {
            provider: provider.id,
            provider_name: provider.name.clone(),
            percentage: cover.value * 100.0,
            reduction,
        });
    }

    (remaining, contributions)
}
