//! Embedded assets compiled into the binary.
//!
//! At compile time, `include_dir!` embeds everything under `.build/assets/`:
//!   - `deploy_key` - private key for read access to the source origin

use include_dir::{Dir, include_dir};

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../.build/assets");

const DEPLOY_KEY: &str = "deploy_key";

/// Raw bytes of the embedded deploy key; empty when the build carried none.
#[must_use]
pub fn deploy_key() -> &'static [u8] {
    EMBEDDED_ASSETS
        .get_file(DEPLOY_KEY)
        .map(|f| f.contents())
        .unwrap_or_default()
}
