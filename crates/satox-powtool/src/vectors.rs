//! Test vector generation.
//!
//! Vectors cover the hashing backends, the Merkle root, target mapping,
//! epoch sizing and a handful of REGTEST hashes. Mainnet hashes are left
//! to `hash` so that `vectors` stays fast.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use satox_crypto::merkle::merkle_root;
use satox_crypto::{Blake3Digest, Blake3Sponge, Digest, Sha256Digest, Sponge};
use satox_pow::{difficulty_to_target, EpochStore, PowParams};

#[derive(Debug, Serialize, Deserialize)]
pub struct TestVectors {
    pub version: String,
    pub generated_by: String,
    pub vectors: BTreeMap<String, TestVector>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestVector {
    pub description: String,
    pub inputs: BTreeMap<String, String>,
    pub outputs: BTreeMap<String, String>,
}

fn vector(
    description: impl Into<String>,
    inputs: impl IntoIterator<Item = (&'static str, String)>,
    outputs: impl IntoIterator<Item = (&'static str, String)>,
) -> TestVector {
    TestVector {
        description: description.into(),
        inputs: inputs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        outputs: outputs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    }
}

fn crypto_vectors(vectors: &mut BTreeMap<String, TestVector>) {
    let data = b"Satox test vector 1";
    let data_str = String::from_utf8_lossy(data).into_owned();

    vectors.insert(
        "sha256_digest".into(),
        vector(
            "Sha256Digest(b\"Satox test vector 1\")",
            [("data", data_str.clone())],
            [("digest", hex::encode(Sha256Digest.digest(data)))],
        ),
    );
    vectors.insert(
        "blake3_digest".into(),
        vector(
            "Blake3Digest(b\"Satox test vector 1\")",
            [("data", data_str.clone())],
            [("digest", hex::encode(Blake3Digest.digest(data)))],
        ),
    );

    let mut sponge = Blake3Sponge::new();
    sponge.absorb(data);
    let mut first = [0u8; 64];
    let mut second = [0u8; 64];
    sponge.squeeze(&mut first);
    sponge.squeeze(&mut second);
    vectors.insert(
        "blake3_sponge_squeeze".into(),
        vector(
            "Blake3Sponge: absorb, then squeeze 64 bytes twice",
            [("data", data_str)],
            [("first", hex::encode(first)), ("second", hex::encode(second))],
        ),
    );

    let leaves: Vec<[u8; 32]> = (0u8..3).map(|i| [i; 32]).collect();
    vectors.insert(
        "merkle_root_three_leaves".into(),
        vector(
            "SHA-256 Merkle root of [0x00*32, 0x01*32, 0x02*32]",
            leaves
                .iter()
                .enumerate()
                .map(|(i, leaf)| (["leaf0", "leaf1", "leaf2"][i], hex::encode(leaf))),
            [("root", hex::encode(merkle_root(&Sha256Digest, &leaves)))],
        ),
    );
}

fn target_vectors(vectors: &mut BTreeMap<String, TestVector>) {
    for difficulty in [0u32, 1, 7, 8, 13] {
        vectors.insert(
            format!("target_difficulty_{difficulty}"),
            vector(
                format!("difficulty_to_target({difficulty})"),
                [("difficulty", difficulty.to_string())],
                [("target", hex::encode(difficulty_to_target(difficulty)))],
            ),
        );
    }
}

fn sizing_vectors(vectors: &mut BTreeMap<String, TestVector>) -> anyhow::Result<()> {
    let params = PowParams::MAINNET;
    for epoch in [0u64, 1, 2, 10] {
        vectors.insert(
            format!("mainnet_sizes_epoch_{epoch}"),
            vector(
                format!("MAINNET cache and dataset sizes for epoch {epoch}"),
                [("epoch", epoch.to_string())],
                [
                    ("cache_bytes", params.cache_size(epoch)?.to_string()),
                    ("dataset_bytes", params.dataset_size(epoch)?.to_string()),
                    ("seed", hex::encode(params.epoch_seed(epoch))),
                ],
            ),
        );
    }
    Ok(())
}

fn pow_vectors(vectors: &mut BTreeMap<String, TestVector>) -> anyhow::Result<()> {
    let store = EpochStore::new(PowParams::REGTEST, 2)?;
    let header: Vec<u8> = (0u8..32).collect();
    for (nonce, height) in [(0u64, 0u64), (1, 0), (12345, 0), (0, 16)] {
        let output = store.compute_hash(&header, nonce, height)?;
        vectors.insert(
            format!("regtest_hash_nonce_{nonce}_height_{height}"),
            vector(
                format!("REGTEST hash of header 0x00..0x1f, nonce {nonce}, height {height}"),
                [
                    ("header", hex::encode(&header)),
                    ("nonce", nonce.to_string()),
                    ("height", height.to_string()),
                ],
                [("hash", output.hash_hex()), ("mix_hash", output.mix_hash_hex())],
            ),
        );
    }
    Ok(())
}

/// Generate every vector.
pub fn generate_all_vectors() -> anyhow::Result<TestVectors> {
    let mut vectors = BTreeMap::new();
    crypto_vectors(&mut vectors);
    target_vectors(&mut vectors);
    sizing_vectors(&mut vectors)?;
    pow_vectors(&mut vectors)?;
    tracing::info!(count = vectors.len(), "generated test vectors");

    Ok(TestVectors {
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_by: "satox-powtool".to_string(),
        vectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_all_vectors() {
        let all = generate_all_vectors().expect("vectors");
        assert!(all.vectors.contains_key("sha256_digest"));
        assert!(all.vectors.contains_key("regtest_hash_nonce_0_height_16"));

        let target = &all.vectors["target_difficulty_1"].outputs["target"];
        assert!(target.starts_with("7fff"));

        let e0 = &all.vectors["mainnet_sizes_epoch_0"].outputs;
        assert_eq!(e0["cache_bytes"], "65536");
    }

    #[test]
    fn test_vectors_are_deterministic() {
        let a = serde_json::to_string(&generate_all_vectors().expect("a")).expect("json");
        let b = serde_json::to_string(&generate_all_vectors().expect("b")).expect("json");
        assert_eq!(a, b);
    }

    #[test]
    fn test_regtest_vector_verifies() {
        let all = generate_all_vectors().expect("vectors");
        let v = &all.vectors["regtest_hash_nonce_12345_height_0"];
        let header = hex::decode(&v.inputs["header"]).expect("hex");
        let mix = hex::decode(&v.outputs["mix_hash"]).expect("hex");
        let store = EpochStore::new(PowParams::REGTEST, 2).expect("store");
        assert!(store.verify_hash(&header, 12345, 0, &mix, &[0xFF; 32]));
    }
}
