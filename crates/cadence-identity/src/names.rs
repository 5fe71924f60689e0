// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pseudonym generation for users who never supply a display name.

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "brisk", "calm", "dapper", "eager", "fuzzy", "gentle", "hasty", "ivory", "jolly",
    "keen", "lively", "mellow", "nimble", "opal", "plucky", "quiet", "rustic", "sly", "tidy",
];

const NOUNS: &[&str] = &[
    "badger", "crane", "dingo", "egret", "ferret", "gecko", "heron", "ibis", "jackal", "koala",
    "lemur", "marten", "newt", "otter", "pika", "quail", "raven", "stoat", "tapir", "wren",
];

/// Generate a readable pseudonym like `brisk-otter-42`.
///
/// Not guaranteed unique; the identity key carries uniqueness, the pseudonym
/// only labels replies and logs.
pub fn generate_pseudonym() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    let number: u8 = rng.gen_range(10..100);
    format!("{adjective}-{noun}-{number}")
}
