//! Cluster configuration extraction
//!
//! A cluster's config blob holds configuration for every integration the
//! cluster supports; currently only the k8s sub-configuration is defined.
//! The extracted string doubles as the freshness fingerprint for cached
//! clients: two fingerprints are equal iff the remote-client-relevant
//! configuration is unchanged.

/// Fingerprint of a cluster's remote-client configuration.
///
/// This is the extracted kubeconfig string itself, compared by equality.
pub type K8sConfigFingerprint = String;

/// Extract the k8s sub-configuration from a cluster config blob.
///
/// The blob is expected to be a JSON object with the kubeconfig YAML stored
/// as a string under the `"k8s"` key. Returns `None` when the blob is not
/// valid JSON, the key is missing, the value is not a string, or the value
/// is blank. Extraction never fails; a cluster without a usable k8s
/// configuration simply has no fingerprint.
pub fn extract_k8s_config(blob: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(blob).ok()?;
    let k8s = value.get("k8s")?.as_str()?;
    if k8s.trim().is_empty() {
        return None;
    }
    Some(k8s.to_string())
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any non-blank string stored under "k8s" is extracted verbatim,
        /// regardless of what else the blob contains.
        #[test]
        fn prop_extract_roundtrips_through_json(
            k8s in "[^\\s]{1,64}",
            other in "[a-z]{0,16}",
        ) {
            let blob = serde_json::json!({ "k8s": &k8s, "extra": other }).to_string();
            prop_assert_eq!(extract_k8s_config(&blob), Some(k8s));
        }

        /// Equal k8s values produce equal fingerprints even when the rest
        /// of the blob differs.
        #[test]
        fn prop_fingerprint_ignores_unrelated_config(
            k8s in "[^\\s]{1,64}",
            a in "[a-z]{0,16}",
            b in "[a-z]{0,16}",
        ) {
            let blob_a = serde_json::json!({ "k8s": &k8s, "yarn": a }).to_string();
            let blob_b = serde_json::json!({ "k8s": &k8s, "yarn": b }).to_string();
            prop_assert_eq!(extract_k8s_config(&blob_a), extract_k8s_config(&blob_b));
        }

        /// Blank k8s values never produce a fingerprint.
        #[test]
        fn prop_blank_values_have_no_fingerprint(ws in "[ \\t\\n]{0,8}") {
            let blob = serde_json::json!({ "k8s": ws }).to_string();
            prop_assert_eq!(extract_k8s_config(&blob), None);
        }
    }
}
