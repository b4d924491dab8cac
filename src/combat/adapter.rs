//! Participation adapter for squad-wide resolvers
//!
//! A `SquadWideResolver` lets every ready unit of the attacking squad take
//! part. `ParticipationFilter` narrows that to an explicit participant list
//! by clearing `can_act` on everyone else for the duration of the call. The
//! flags are restored by `CanActGuard::drop`, so a panicking resolver cannot
//! leave units disabled.

use std::ops::{Deref, DerefMut};

use crate::combat::events::CombatLog;
use crate::combat::resolver::{AttackRequest, AttackResolver, Dice, SquadCombatResolver};
use crate::core::types::{SquadId, UnitId};
use crate::squads::SquadRoster;

/// Resolver with no notion of per-unit participation
pub trait SquadWideResolver {
    fn resolve_squad_attack(
        &mut self,
        roster: &mut SquadRoster,
        attacker: SquadId,
        defender: SquadId,
        distance: u32,
    ) -> CombatLog;
}

impl<D: Dice> SquadWideResolver for SquadCombatResolver<D> {
    fn resolve_squad_attack(
        &mut self,
        roster: &mut SquadRoster,
        attacker: SquadId,
        defender: SquadId,
        distance: u32,
    ) -> CombatLog {
        let participants = roster
            .units_in_squad(attacker)
            .filter(|u| u.is_ready())
            .map(|u| u.id)
            .collect();
        let request = AttackRequest {
            attacker,
            defender,
            distance,
            participants,
        };
        self.resolve_attack(roster, &request)
    }
}

/// Disables every ready unit of a squad outside `keep`; re-enables on drop
pub struct CanActGuard<'a> {
    roster: &'a mut SquadRoster,
    disabled: Vec<UnitId>,
}

impl<'a> CanActGuard<'a> {
    pub fn disable_outside(roster: &'a mut SquadRoster, squad: SquadId, keep: &[UnitId]) -> Self {
        let candidates: Vec<UnitId> = roster
            .units_in_squad(squad)
            .filter(|u| u.can_act && !keep.contains(&u.id))
            .map(|u| u.id)
            .collect();

        let mut disabled = Vec::with_capacity(candidates.len());
        for id in candidates {
            if let Some(unit) = roster.unit_mut(id) {
                unit.can_act = false;
                disabled.push(id);
            }
        }
        Self { roster, disabled }
    }

    pub fn disabled(&self) -> &[UnitId] {
        &self.disabled
    }
}

impl Deref for CanActGuard<'_> {
    type Target = SquadRoster;

    fn deref(&self) -> &SquadRoster {
        &*self.roster
    }
}

impl DerefMut for CanActGuard<'_> {
    fn deref_mut(&mut self) -> &mut SquadRoster {
        &mut *self.roster
    }
}

impl Drop for CanActGuard<'_> {
    fn drop(&mut self) {
        for id in self.disabled.drain(..) {
            if let Some(unit) = self.roster.unit_mut(id) {
                unit.can_act = true;
            }
        }
    }
}

/// Presents a `SquadWideResolver` as an `AttackResolver`
pub struct ParticipationFilter<R> {
    inner: R,
}

impl<R: SquadWideResolver> ParticipationFilter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: SquadWideResolver> AttackResolver for ParticipationFilter<R> {
    fn resolve_attack(&mut self, roster: &mut SquadRoster, request: &AttackRequest) -> CombatLog {
        let mut guard = CanActGuard::disable_outside(roster, request.attacker, &request.participants);
        tracing::debug!(
            "Sitting out {} units of squad {}",
            guard.disabled().len(),
            request.attacker
        );
        self.inner
            .resolve_squad_attack(&mut guard, request.attacker, request.defender, request.distance)
    }
}
