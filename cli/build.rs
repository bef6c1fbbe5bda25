/// Ensure `.build/assets/` exists so `include_dir!()` never panics.
///
/// Release builds drop the real deploy key into `.build/assets/deploy_key`;
/// this script only creates an empty stub when it is missing (CI lint / test,
/// local dev).
use std::fs;
use std::path::PathBuf;

fn main() {
    let assets: PathBuf = [env!("CARGO_MANIFEST_DIR"), "..", ".build", "assets"]
        .iter()
        .collect();

    let key = assets.join("deploy_key");
    if !key.is_file() {
        fs::create_dir_all(&assets).unwrap_or_else(|e| panic!("create {}: {e}", assets.display()));
        fs::write(&key, []).unwrap_or_else(|e| panic!("write {}: {e}", key.display()));
    }

    println!("cargo::rerun-if-changed=../.build/assets");
}
