//! Curriculum content and generation.
//!
//! The curriculum is derived from a static content tree ([`BOOK`]) and
//! installed into the record store by `dojo init` or `dojo catalog`.

pub mod book;
pub mod generator;

pub use book::{Book, Chapter, Section, SkillEntry, BOOK};
pub use generator::{generate_curriculum, xp_reward, Curriculum};
