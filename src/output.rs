use std::path::Path;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::ScannerError;

/// Default location of the output artifact, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "output/whitelistedBeraVaults.json";

/// The persisted result of a scan: `{ "vaults": ["0x...", ...] }`.
///
/// Addresses are written in EIP-55 checksummed form and in discovery order. Reading accepts any
/// hex casing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistedVaults {
    #[serde(with = "checksummed")]
    pub vaults: Vec<Address>,
}

impl WhitelistedVaults {
    #[must_use]
    pub fn new(vaults: Vec<Address>) -> Self {
        Self { vaults }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }

    /// Encodes the artifact as compact JSON.
    pub fn to_json(&self) -> Result<String, ScannerError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ScannerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the artifact to `path`, creating the file or truncating an existing one.
    ///
    /// The parent directory must already exist.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ScannerError> {
        let path = path.as_ref();
        let json = self.to_json()?;

        if let Err(e) = tokio::fs::write(path, json).await {
            error!(error = %e, path = %path.display(), "failed to write whitelisted vaults");
            return Err(e.into());
        }

        info!(path = %path.display(), vault_count = self.len(), "Wrote whitelisted vaults");
        Ok(())
    }

    /// Reads an artifact previously written by [`write_to`](Self::write_to).
    pub async fn read_from(path: impl AsRef<Path>) -> Result<Self, ScannerError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

impl From<Vec<Address>> for WhitelistedVaults {
    fn from(vaults: Vec<Address>) -> Self {
        Self::new(vaults)
    }
}

mod checksummed {
    use alloy::primitives::Address;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        vaults: &[Address],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(vaults.iter().map(|vault| vault.to_checksum(None)))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Address>, D::Error> {
        Vec::<Address>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const REGISTRY: &str = "0xdf960E8F3F19C481dDE769edEDD439ea1a63426a";
    const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    #[test]
    fn empty_artifact_is_compact() {
        assert_eq!(WhitelistedVaults::default().to_json().unwrap(), r#"{"vaults":[]}"#);
    }

    #[test]
    fn addresses_are_written_checksummed() {
        let vaults = WhitelistedVaults::new(vec![
            address!("0xdf960e8f3f19c481dde769ededd439ea1a63426a"),
            address!("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
        ]);

        assert_eq!(vaults.to_json().unwrap(), format!(r#"{{"vaults":["{REGISTRY}","{VITALIK}"]}}"#));
    }

    #[test]
    fn json_round_trip_is_exact() {
        let json = format!(r#"{{"vaults":["{VITALIK}","{REGISTRY}","{VITALIK}"]}}"#);

        let vaults = WhitelistedVaults::from_json(&json).unwrap();

        assert_eq!(vaults.len(), 3);
        assert_eq!(vaults.to_json().unwrap(), json);
    }

    #[test]
    fn lowercase_input_is_accepted() {
        let vaults = WhitelistedVaults::from_json(
            r#"{"vaults":["0xd8da6bf26964af9d7eed9e03e53415d37aa96045"]}"#,
        )
        .unwrap();

        assert_eq!(vaults.vaults, vec![address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")]);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let result = WhitelistedVaults::from_json(r#"{"vaults":["not an address"]}"#);
        assert!(matches!(result, Err(ScannerError::Serialization(_))));
    }

    #[tokio::test]
    async fn write_truncates_existing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("whitelistedBeraVaults.json");
        tokio::fs::write(&path, "x".repeat(4096)).await?;

        WhitelistedVaults::default().write_to(&path).await?;

        assert_eq!(tokio::fs::read_to_string(&path).await?, r#"{"vaults":[]}"#);
        Ok(())
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing").join("whitelistedBeraVaults.json");

        let result = WhitelistedVaults::default().write_to(&path).await;

        assert!(matches!(result, Err(ScannerError::Io(_))));
        Ok(())
    }
}
