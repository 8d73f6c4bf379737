use crate::domain::registry::Registry;
use crate::domain::state::ChunkClaim;
use crate::domain::tuning::{ClaimPolicy, Tuning};
use crate::domain::vector::{self, Vec2};

/// Whether `player_id` may home in on a chunk with the given open claim.
pub fn is_eligible(claim: Option<ChunkClaim>, player_id: u64, policy: ClaimPolicy) -> bool {
    match (claim, policy) {
        (None, _) => true,
        (Some(c), ClaimPolicy::OwnerExcluded) => c.owner_id != player_id,
        (Some(c), ClaimPolicy::OwnerOnly) => c.owner_id == player_id,
    }
}

/// Steers every chunk toward its nearest eligible player and lets players absorb chunks
/// they touch.
pub fn attract(registry: &mut Registry, tuning: &Tuning) {
    let ct = &tuning.chunk;
    let ids: Vec<u64> = registry.chunks.keys().copied().collect();

    for chunk_id in ids {
        let Some(chunk) = registry.chunks.get(&chunk_id).filter(|c| !c.deleted) else {
            continue;
        };
        let (chunk_pos, chunk_radius) = (chunk.pos, chunk.radius);
        // A claim whose owner has left the arena no longer means anything.
        let claim = chunk
            .active_claim()
            .filter(|c| registry.is_live_player(c.owner_id));

        let nearest = registry
            .players
            .values()
            .filter(|p| p.is_live() && is_eligible(claim, p.id, ct.claim_policy))
            .map(|p| {
                let gap = p.pos.distance(chunk_pos) - p.radius - chunk_radius;
                (p.id, p.pos, gap)
            })
            .filter(|&(_, _, gap)| gap <= ct.attract_distance)
            .min_by(|a, b| a.2.total_cmp(&b.2));
        let Some((player_id, player_pos, gap)) = nearest else {
            continue;
        };

        if gap < 0.0 {
            // Overlapping: absorb.
            if let Some(c) = registry.chunks.get_mut(&chunk_id) {
                c.deleted = true;
            }
            if let Some(p) = registry.players.get_mut(&player_id) {
                p.radius += chunk_radius;
            }
        } else if let Some(c) = registry.chunks.get_mut(&chunk_id) {
            c.vel = vector::normalize_or(player_pos - chunk_pos, Vec2::ZERO) * ct.speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::Player;

    fn setup(players: &[Vec2]) -> (Registry, Tuning, Vec<u64>) {
        let tuning = Tuning::default();
        let mut reg = Registry::new();
        let ids = players
            .iter()
            .map(|&pos| {
                let id = reg.allocate_id();
                reg.insert_player(Player::new(id, format!("p{id}"), pos, &tuning.player));
                id
            })
            .collect();
        (reg, tuning, ids)
    }

    fn claimed_by(owner_id: u64) -> Option<ChunkClaim> {
        Some(ChunkClaim::new(owner_id, 10.0))
    }

    #[test]
    fn touching_chunk_is_absorbed_exactly_once() {
        let (mut reg, tuning, ids) = setup(&[Vec2::new(100.0, 100.0)]);
        let chunk = reg.spawn_chunk(Vec2::new(130.0, 100.0), Vec2::ZERO, 4.0, None);
        attract(&mut reg, &tuning);
        attract(&mut reg, &tuning);
        assert!(reg.chunks[&chunk].deleted);
        assert_eq!(reg.players[&ids[0]].radius, 34.0);
    }

    #[test]
    fn chunk_homes_on_nearest_player_by_edge_distance() {
        let (mut reg, tuning, ids) = setup(&[Vec2::new(0.0, 0.0), Vec2::new(300.0, 0.0)]);
        // Far-away center but a huge body: its edge is closer.
        reg.players.get_mut(&ids[1]).unwrap().radius = 130.0;
        let chunk = reg.spawn_chunk(Vec2::new(140.0, 0.0), Vec2::ZERO, 4.0, None);
        attract(&mut reg, &tuning);
        let c = &reg.chunks[&chunk];
        assert!(!c.deleted);
        assert!((c.vel - Vec2::new(tuning.chunk.speed, 0.0)).length() < 1e-5);
    }

    #[test]
    fn out_of_range_chunk_keeps_drifting() {
        let (mut reg, tuning, _) = setup(&[Vec2::new(0.0, 0.0)]);
        let chunk = reg.spawn_chunk(Vec2::new(1000.0, 0.0), Vec2::new(0.0, 1.0), 4.0, None);
        attract(&mut reg, &tuning);
        assert_eq!(reg.chunks[&chunk].vel, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn owner_excluded_while_claim_is_open() {
        let (mut reg, tuning, ids) = setup(&[Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0)]);
        let (owner, other) = (ids[0], ids[1]);
        // Touching the owner, within range of the other player.
        let chunk = reg.spawn_chunk(Vec2::new(132.0, 100.0), Vec2::ZERO, 4.0, claimed_by(owner));

        attract(&mut reg, &tuning);

        let c = &reg.chunks[&chunk];
        assert!(!c.deleted, "owner must not absorb its own debris early");
        assert!(c.vel.x > 0.0, "heads for the other player");
        assert_eq!(reg.players[&owner].radius, 30.0);
        assert_eq!(reg.players[&other].radius, 30.0);
    }

    #[test]
    fn owner_only_policy_never_attracts_to_others() {
        let (mut reg, mut tuning, ids) =
            setup(&[Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0)]);
        tuning.chunk.claim_policy = ClaimPolicy::OwnerOnly;
        let (owner, nearer) = (ids[0], ids[1]);
        reg.players.get_mut(&owner).unwrap().pos = Vec2::new(0.0, 100.0);
        let chunk = reg.spawn_chunk(Vec2::new(160.0, 100.0), Vec2::ZERO, 4.0, claimed_by(owner));

        attract(&mut reg, &tuning);

        let c = &reg.chunks[&chunk];
        assert!(!c.deleted);
        assert!(c.vel.x < 0.0, "steers toward the owner, not the nearer player");
        assert_eq!(reg.players[&nearer].radius, 30.0);
    }

    #[test]
    fn expired_claim_is_open_to_everyone() {
        let (mut reg, tuning, ids) = setup(&[Vec2::new(100.0, 100.0)]);
        let claim = Some(ChunkClaim::new(ids[0], 0.0));
        let chunk = reg.spawn_chunk(Vec2::new(132.0, 100.0), Vec2::ZERO, 4.0, claim);
        attract(&mut reg, &tuning);
        assert!(reg.chunks[&chunk].deleted);
        assert_eq!(reg.players[&ids[0]].radius, 34.0);
    }

    #[test]
    fn claim_of_departed_owner_is_void() {
        let (mut reg, mut tuning, ids) =
            setup(&[Vec2::new(100.0, 100.0), Vec2::new(400.0, 100.0)]);
        tuning.chunk.claim_policy = ClaimPolicy::OwnerOnly;
        reg.players.get_mut(&ids[0]).unwrap().deleted = true;
        let chunk = reg.spawn_chunk(Vec2::new(370.0, 100.0), Vec2::ZERO, 4.0, claimed_by(ids[0]));
        attract(&mut reg, &tuning);
        assert!(reg.chunks[&chunk].deleted);
        assert_eq!(reg.players[&ids[1]].radius, 34.0);
    }
}
