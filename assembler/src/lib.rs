pub mod assemble;
pub mod config;
pub mod deck;
pub mod entity;
pub mod error;
pub mod expand;
pub mod resolver;
pub mod slideshow;
pub mod source;

pub use assemble::DeckAssembler;
pub use config::DeckOptions;
pub use deck::Deck;
pub use entity::{EntityId, SlideEntity};
pub use error::{ConfigError, LoadError, SourceLoadError};
pub use slideshow::{DeckEvent, LoadOutcome, SlideShow, Source};
