use sha2::{Digest, Sha256};

const SESSION_LABEL: &str = "session";
const RESTART_LABEL: &str = "restart";

/// Seed of the `ordinal`-th session created from `global`.
pub(crate) fn session_seed(global: u64, ordinal: u64) -> u64 {
    derive_labeled_seed(global, SESSION_LABEL, ordinal)
}

/// Seed of the spawn stream after `restarts` restarts of a session.
pub(crate) fn spawn_seed(session: u64, restarts: u64) -> u64 {
    derive_labeled_seed(session, RESTART_LABEL, restarts)
}

fn derive_labeled_seed(base: u64, label: &str, ordinal: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update(ordinal.to_le_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
