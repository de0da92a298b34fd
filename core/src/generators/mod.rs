//! Primitive value generators.
//!
//! Every primitive takes the seed it should start from by value and is
//! pure given that seed. Multi-draw primitives walk a local `SeedChain`.
//!
//! Composite primitives (UUID, QQ number, IPv4) are not computed here:
//! `composite` builds pool templates for them and the evaluator runs those
//! templates like any other pool.

pub mod choice;
pub mod composite;
pub mod numeric;
pub mod text;

pub use choice::{choose, weighted_random, WeightedEntry};
pub use composite::{ipv4_template, qq_number_template, uuid_template, Ipv4Options, Template};
pub use numeric::{normal_random_int, random_int};
pub use text::{random_character, random_number_id};
