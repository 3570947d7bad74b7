pub mod adc;
pub mod backlight;
pub mod lcd;
pub mod serial_console;
pub mod seven_segment;

pub use adc::{AdcConverter, AdcInput, Reference, Sensor, SharedAdc};
pub use backlight::Backlight;
pub use lcd::{Lcd, ParallelBus};
pub use serial_console::SerialConsole;
pub use seven_segment::{SevenSegment, Symbol};
