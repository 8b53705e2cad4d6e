//! Domain entities built from a spec file.

pub mod arena;
pub mod dummy;
pub mod event;
pub mod metaparser;
pub mod player;
pub mod setup;
pub mod types;

pub use arena::Arena;
pub use dummy::DummyPlayer;
pub use event::Event;
pub use metaparser::{parse_meta, MetaTags, MetaValue, Metadata, Shape};
pub use player::{Gender, Player, PlayerId};
pub use setup::{Setup, SetupOverrides};
pub use types::{EventPools, Royale, Winner};
