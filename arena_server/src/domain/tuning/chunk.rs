/// Gameplay tuning for debris chunks.

/// Who may collect a chunk while its claim window is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimPolicy {
    /// The claiming player must wait out the window; everyone else may collect immediately.
    OwnerExcluded,
    /// Only the claiming player may collect until the window closes.
    OwnerOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct ChunkTuning {
    /// Launch speed on ejection and homing speed while attracted.
    pub speed: f32,

    /// Edge-to-edge distance within which a chunk homes in on a player.
    pub attract_distance: f32,

    /// Seconds a claim stays active after the chunk is ejected.
    pub claim_timeout: f32,

    /// Velocity retained per tick while drifting without a target.
    pub friction: f32,

    pub claim_policy: ClaimPolicy,
}

impl Default for ChunkTuning {
    fn default() -> Self {
        Self {
            speed: 6.0,
            attract_distance: 150.0,
            claim_timeout: 1.5,
            friction: 0.95,
            claim_policy: ClaimPolicy::OwnerExcluded,
        }
    }
}
