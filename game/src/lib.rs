pub mod combat;
pub mod entities;
pub mod error;
pub mod game_loop;
pub mod gesture;
pub mod hud;
pub mod landmarks;
pub mod phase;
pub mod playtest;
pub mod progression;
pub mod projection;
pub mod render;
pub mod session;
pub mod settings;
pub mod sfx;
pub mod simulation;

pub use error::{AcquisitionError, LandmarkError, RecordingError};
pub use game_loop::{Game, SpellInput, SpellcastLogic};
pub use session::{GameEvent, Session, SessionSnapshot, TickReport};
pub use settings::GameConfig;
