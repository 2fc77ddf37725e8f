//! Test utilities & fixtures.
//! Every integration test works against a throwaway data directory.

use rand::rngs::StdRng;
use rand::SeedableRng;
use worldbuilder::store::TableStore;

/// A fresh store rooted in a temp dir. Keep the guard alive for the test.
pub fn temp_store() -> (TableStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    (TableStore::new(dir.path()), dir)
}

#[allow(dead_code)] // Not every test file rolls dice.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
