//! Seven-segment exercises that preceded the dashboard
//!
//! Each one is a small state machine fed by interrupt flags or kernel
//! queues. The firmware binaries in `src/bin` wire them to the board.

pub mod countdown;
pub mod reflex;
pub mod scoreboard;

pub use countdown::Countdown;
pub use reflex::{Reflex, ServoPosition};
pub use scoreboard::{Display, Receiver, Sender};
