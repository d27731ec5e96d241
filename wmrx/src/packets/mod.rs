pub mod barometer;
pub mod clock;
pub mod message;
pub mod rain;
pub mod temperature;
pub mod uv;
pub mod wind;

// Re-export commonly used types
pub use barometer::Barometer;
pub use clock::Clock;
pub use message::{PacketType, WmrMessage};
pub use rain::Rain;
pub use temperature::Temperature;
pub use uv::Uv;
pub use wind::Wind;
