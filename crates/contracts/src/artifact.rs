//! Loading of Hardhat build artifacts for contract deployment.

use {
    alloy::{json_abi::JsonAbi, primitives::Bytes},
    serde::Deserialize,
    std::path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read artifact {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact {path} is not valid JSON")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact for {0} has no creation bytecode (interface or abstract contract?)")]
    NoBytecode(String),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_slice(&contents).map_err(|source| Error::Json {
            path: path.to_owned(),
            source,
        })
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.abi.functions.contains_key(name)
    }

    /// Creation bytecode followed by the ABI encoded constructor arguments.
    pub fn deployment_code(&self, constructor_args: &[u8]) -> Result<Bytes, Error> {
        if self.bytecode.is_empty() {
            return Err(Error::NoBytecode(self.contract_name.clone()));
        }
        Ok([self.bytecode.as_ref(), constructor_args].concat().into())
    }
}
