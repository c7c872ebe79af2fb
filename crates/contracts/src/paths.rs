//! Default locations of the Hardhat build artifacts, relative to the
//! Hardhat project root.

use std::path::{Path, PathBuf};

pub const ARTIFACTS_DIR: &str = "artifacts/contracts";

pub const TOKEN: &str = "MockERC20";
pub const FACTORY: &str = "SimpleFactory";
pub const ROUTER: &str = "RouterV2";

/// `<root>/artifacts/contracts/<Name>.sol/<Name>.json`
pub fn artifact(root: &Path, contract: &str) -> PathBuf {
    root.join(ARTIFACTS_DIR)
        .join(format!("{contract}.sol"))
        .join(format!("{contract}.json"))
}
