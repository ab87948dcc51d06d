//! Reactive sparring core: schedules punch targets from either a
//! choreographed beat map or an AI-suggested combination stream, tests
//! tracked hand positions against them, and keeps session statistics.
//!
//! The heavy collaborators (camera, landmark detector, text-generation
//! service, audio transport, persistence) live outside this crate and are
//! touched only through the boundaries in [`tracking`], [`combo`],
//! [`clock`] and the stats handed out of [`session::Session::stop`].

pub mod clock;
pub mod combo;
pub mod detect;
pub mod error;
pub mod events;
pub mod render;
pub mod schedule;
pub mod session;
pub mod stats;
pub mod tracking;

pub use error::SessionError;
pub use session::{Session, SessionConfig};
