//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the early expiration math, codec round trips and
//! node store behaviour against an in-memory node.

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::MemoryBackend;
use crate::cache::{NodeStore, PerParams};
use crate::codec::{Codec, JsonCodec};
use crate::domain::Member;
use crate::random::{RandomSource, SeededRandom};

// == Strategies ==
/// Generates draws in (0, 1]
fn unit_draw_strategy() -> impl Strategy<Value = f64> {
    (1u32..=u32::MAX).prop_map(|n| n as f64 / u32::MAX as f64)
}

/// Generates plausible PER tuning
fn per_params_strategy() -> impl Strategy<Value = PerParams> {
    (0i64..120_000, 0.01f64..10.0).prop_map(|(delta_ms, beta)| PerParams::new(delta_ms, beta))
}

/// Generates members with arbitrary names
fn member_strategy() -> impl Strategy<Value = Member> {
    (any::<i64>(), ".{0,64}").prop_map(|(id, name)| Member::new(id, name))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // **Property 1: Early Expiration Never Extends Lifetime**
    // *For any* remaining TTL and draw in (0, 1], the score SHALL NOT exceed
    // the remaining TTL.
    #[test]
    fn prop_score_never_exceeds_remaining(
        per in per_params_strategy(),
        remaining in 0i64..1_000_000_000,
        u in unit_draw_strategy()
    ) {
        let score = per.score(remaining, u);
        prop_assert!(score <= remaining as f64, "score {} > remaining {}", score, remaining);
    }

    // **Property 2: Early Expiration Is Monotonic In Remaining TTL**
    // *For any* fixed draw, if an entry with remaining TTL `r` is expired early,
    // every entry with less remaining TTL SHALL be expired early too.
    #[test]
    fn prop_expiry_monotonic_in_remaining(
        per in per_params_strategy(),
        longer in 0i64..1_000_000,
        shrink in 0i64..1_000_000,
        u in unit_draw_strategy()
    ) {
        let shorter = (longer - shrink).max(0);
        if per.expires_early(longer, u) {
            prop_assert!(per.expires_early(shorter, u));
        }
    }

    // **Property 3: Codec Round Trip**
    // *For any* member, decoding its encoding SHALL return an equal member.
    #[test]
    fn prop_codec_roundtrip(member in member_strategy()) {
        let raw = JsonCodec.encode(&member).unwrap();
        let decoded: Member = JsonCodec.decode(&raw).unwrap();
        prop_assert_eq!(decoded, member);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // **Property 4: Node Store Round Trip**
    // *For any* member written with a TTL far larger than the PER window,
    // an immediate read SHALL return the same member.
    #[test]
    fn prop_node_store_roundtrip(member in member_strategy(), seed in any::<u64>()) {
        let store = NodeStore::new(
            0,
            Arc::new(MemoryBackend::new()),
            PerParams::default(),
            Arc::new(SeededRandom::new(seed)),
            Duration::from_secs(1),
        );
        let key = member.cache_key();

        let found: Option<Member> = tokio_test::block_on(async {
            store.set(&key, &member, Duration::from_secs(3_600)).await.unwrap();
            store.get(&key).await.unwrap()
        });

        prop_assert_eq!(found, Some(member));
    }
}

// == Property Test for Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // **Property 5: Error Response Format**
    // *For any* error, the HTTP response SHALL carry a JSON body with an
    // "error" string containing the message.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::CacheError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::BackendUnavailable(error_msg.clone()),
            CacheError::BackendTimeout(error_msg.clone()),
            CacheError::Deserialization(error_msg.clone()),
            CacheError::InvalidRequest(error_msg.clone()),
            CacheError::Config(error_msg.clone()),
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let body = error.into_response().into_body();
            let bytes = tokio_test::block_on(async { to_bytes(body, usize::MAX).await.unwrap() });

            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");
            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
            prop_assert_eq!(json["status"].as_str(), Some("error"));
        }
    }
}

// == Statistical Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TRIALS: usize = 4_000;

    fn early_expiry_count(per: &PerParams, remaining_ms: i64, random: &dyn RandomSource) -> usize {
        (0..TRIALS)
            .filter(|_| per.expires_early(remaining_ms, random.unit()))
            .count()
    }

    #[test]
    fn test_early_expiry_frequency_rises_as_deadline_nears() {
        let per = PerParams::default();
        let random = SeededRandom::new(42);

        // Expected rates are exp(-remaining / delta): ~0.14, ~0.37, ~0.72, ~0.97
        let counts: Vec<usize> = [6_000, 3_000, 1_000, 100]
            .iter()
            .map(|remaining| early_expiry_count(&per, *remaining, &random))
            .collect();

        for pair in counts.windows(2) {
            assert!(pair[0] <= pair[1], "frequency dropped: {:?}", counts);
        }
        assert!(counts[0] < TRIALS / 4, "too eager far from expiry: {:?}", counts);
        assert!(counts[3] > TRIALS * 9 / 10, "too lazy at expiry: {:?}", counts);
    }

    #[test]
    fn test_higher_beta_expires_more_often() {
        let random = SeededRandom::new(7);
        let lazy = early_expiry_count(&PerParams::new(3_000, 0.5), 3_000, &random);
        let eager = early_expiry_count(&PerParams::new(3_000, 2.0), 3_000, &random);
        // exp(-2) ~ 0.14 against exp(-0.5) ~ 0.61
        assert!(lazy < eager, "lazy {} eager {}", lazy, eager);
    }
}
