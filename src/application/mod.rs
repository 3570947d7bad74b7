//! Dashboard tasks
//!
//! Sensors are read through the shared ADC. Readings flow either to the
//! LCD message queue, drained by the marshaller, or to the serial
//! reporter. The activity task wakes the backlight gate, which parks and
//! releases the backlight regulator.

pub mod activity;
pub mod backlight;
pub mod lcd;
pub mod report;

#[cfg(test)]
mod scenarios;

pub use activity::Activity;
pub use backlight::{BacklightMode, Gate, Regulator};
pub use lcd::{AdcReporter, Marshaller, Scroll, Scroller};
pub use report::SerialReporter;

use crate::config::{LCD_COLUMNS, LCD_QUEUE_CAPACITY, MAX_TASKS};
use crate::rtos::Queue;
use heapless::String;

/// Kernel slots of the dashboard tasks
pub mod ids {
    use crate::rtos::TaskId;

    pub const ACTIVITY: TaskId = TaskId(0);
    pub const REGULATOR: TaskId = TaskId(1);
    pub const GATE: TaskId = TaskId(2);
    pub const MARSHALLER: TaskId = TaskId(3);
    pub const SCROLLER: TaskId = TaskId(4);
    pub const ADC_REPORTER: TaskId = TaskId(5);
    pub const SERIAL_REPORTER: TaskId = TaskId(6);
}

/// Number of kernel slots used by the dashboard
pub const TASK_COUNT: usize = ids::SERIAL_REPORTER.index() + 1;

const _: () = assert!(TASK_COUNT <= MAX_TASKS);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Upper = 0,
    Lower = 1,
}

/// One line of LCD text, at most 16 characters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LcdMessage {
    pub line: Line,
    pub text: String<LCD_COLUMNS>,
}

impl LcdMessage {
    /// Build a message from `text`, cutting it at 16 characters
    pub fn new(line: Line, text: &str) -> Self {
        let mut truncated = String::new();
        for c in text.chars() {
            if truncated.push(c).is_err() {
                break;
            }
        }
        Self { line, text: truncated }
    }
}

pub type LcdQueue = Queue<LcdMessage, LCD_QUEUE_CAPACITY>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_cut_at_sixteen_characters() {
        let message = LcdMessage::new(Line::Lower, " DTEK0068 Embedded Microprocessor Systems ");
        assert_eq!(message.text.as_str(), " DTEK0068 Embedd");
        assert_eq!(LcdMessage::new(Line::Upper, "short").text.as_str(), "short");
    }
}
