use rand::Rng;

use dafo::FactorOracle;

fn generate_random_text(size: usize, charset: &[u8]) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|_| charset[rng.gen_range(0..charset.len())])
        .collect()
}

fn naive_is_substring(text: &[u8], pattern: &[u8]) -> bool {
    pattern.is_empty() || text.windows(pattern.len()).any(|w| w == pattern)
}

/// Every substring of the text must be accepted, whatever the text looks like.
#[test]
fn test_random_texts_accept_all_factors() {
    for &(size, charset) in &[
        (1, b"ab".as_slice()),
        (10, b"ab".as_slice()),
        (100, b"ab".as_slice()),
        (100, b"random".as_slice()),
        (500, b"abcdefgh".as_slice()),
    ] {
        for _ in 0..10 {
            let text = generate_random_text(size, charset);
            let oracle = FactorOracle::new(&text).unwrap();
            for i in 0..=text.len() {
                for j in i..=text.len() {
                    assert!(
                        oracle.is_factor(&text[i..j]),
                        "text={text:?} range={i}..{j}"
                    );
                }
            }
        }
    }
}

/// Random binary texts with the full byte range.
#[test]
fn test_random_binary_texts_accept_all_factors() {
    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        let text: Vec<u8> = (0..200).map(|_| rng.gen_range(0..=255)).collect();
        let oracle = FactorOracle::new(&text).unwrap();
        for i in 0..=text.len() {
            for j in i..=text.len() {
                assert!(oracle.is_factor(&text[i..j]));
            }
        }
    }
}

/// A query containing a byte that never occurs in the text must reject.
///
/// The oracle is permissive for non-substrings in general (it may accept a bounded number
/// of them), so rejection can only be asserted for foreign bytes.
#[test]
fn test_foreign_bytes_reject() {
    for _ in 0..10 {
        let text = generate_random_text(200, b"abc");
        let oracle = FactorOracle::new(&text).unwrap();
        for _ in 0..100 {
            let mut query = generate_random_text(10, b"abc");
            let mut rng = rand::thread_rng();
            query[rng.gen_range(0..10)] = b'z';
            assert!(!oracle.is_factor(&query));
        }
    }
}

/// Accepted queries must never contradict a naive scan: every actual substring is
/// accepted, and acceptance answers are stable across repeated calls.
#[test]
fn test_random_queries_against_naive_scan() {
    let text = generate_random_text(300, b"random");
    let oracle = FactorOracle::new(&text).unwrap();
    for _ in 0..1000 {
        let len = rand::thread_rng().gen_range(0..8);
        let query = generate_random_text(len, b"random");
        let accepted = oracle.is_factor(&query);
        if naive_is_substring(&text, &query) {
            assert!(accepted, "text={text:?} query={query:?}");
        }
        assert_eq!(accepted, oracle.is_factor(&query));
    }
}

/// Two builds over the same text must answer queries identically.
#[test]
fn test_deterministic_acceptance() {
    let text = generate_random_text(200, b"abcd");
    let oracle_a = FactorOracle::new(&text).unwrap();
    let oracle_b = FactorOracle::new(&text).unwrap();
    for _ in 0..1000 {
        let len = rand::thread_rng().gen_range(0..12);
        let query = generate_random_text(len, b"abcde");
        assert_eq!(oracle_a.is_factor(&query), oracle_b.is_factor(&query));
    }
}
