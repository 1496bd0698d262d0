use rand::Rng;
use rand::distr::Alphanumeric;

const ID_LEN: usize = 12;

/// A fresh random identifier for nodes, edges and timers.
///
/// Identifiers carry no content; two calls never share a value in practice.
pub fn random_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}
