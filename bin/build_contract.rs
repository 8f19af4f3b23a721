//! Binary for building WASM contracts from odra modules.
#![doc = "Binary for building WASM contracts from odra modules."]

#[allow(unused_imports)]
use oracle_reward_vault;

fn main() {
    // Compilation to WASM is driven by odra-build
}
