//! Configuration constants for the ATmega4809 dashboard firmware

/// CPU frequency in Hz (20 MHz / 6)
pub const CPU_FREQ_HZ: u32 = 3_333_333;

/// Kernel tick rate
pub const TICK_HZ: u32 = 1000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Maximum number of kernel tasks per firmware image
pub const MAX_TASKS: usize = 8;

/// Delay every task waits before its first action
pub const STARTUP_GUARD_MS: u32 = 200;

/// LCD power stabilization delay before the init sequence
pub const LCD_POWER_UP_MS: u32 = 100;
pub const LCD_ENABLE_PULSE_US: u16 = 1;
pub const LCD_COMMAND_DELAY_US: u16 = 40;
pub const LCD_CLEAR_DELAY_US: u16 = 2000;
pub const LCD_COLUMNS: usize = 16;
pub const LCD_QUEUE_CAPACITY: usize = 2;

/// Banner shown on the lower LCD line
pub const MANUFACTURER_TEXT: &str = " DTEK0068 Embedded Microprocessor Systems ";

/// Banner scroll speed in characters per second, zero or less disables scrolling
pub const SCROLL_SPEED_CPS: i16 = 5;

pub const ADC_REPORT_CELL_MS: u32 = 660;
pub const SERIAL_REPORT_MS: u32 = 1000;

pub const BACKLIGHT_PERIOD_MS: u32 = 75;
pub const INACTIVITY_TIMEOUT_MS: u32 = 10_000;

pub const ACTIVITY_PERIOD_MS: u32 = 100;

/// Minimum potentiometer change that counts as user activity
pub const POT_DEADBAND: u16 = 10;

/// Capacity of the log ring drained by the serial reporter
pub const LOG_BUFFER_SIZE: usize = 128;

// Precursor exercises

/// RTC periodic interrupts per countdown second (125 ms each)
pub const PIT_TICKS_PER_SECOND: u8 = 8;
pub const COUNTDOWN_START: u8 = 10;
pub const COUNTDOWN_BLINK_MS: u16 = 333;

pub const SCOREBOARD_QUEUE_CAPACITY: usize = 10;
pub const SCOREBOARD_SEND_TIMEOUT_MS: u32 = 10;

/// RTC overflow period for the servo (~100 ms with DIV64 on 32.768 kHz)
pub const RTC_SERVO_PERIOD: u16 = 51;
pub const SERVO_PWM_PERIOD: u16 = 0x1046;
pub const SERVO_DUTY_NEUTRAL: u16 = 312;
pub const SERVO_DUTY_DOWN: u16 = 364;
