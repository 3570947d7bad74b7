//! LCD sensor dashboard firmware for the ATmega4809
//!
//! The portable core (kernel, drivers, tasks and the precursor state
//! machines) builds for the host as well, where it is exercised by tests.
//! The register-level `hal` only exists on the AVR target.

#![cfg_attr(not(test), no_std)]

pub mod application;
pub mod config;
pub mod drivers;
pub mod logger;
pub mod os;
pub mod precursor;
pub mod rtos;

#[cfg(target_arch = "avr")]
pub mod hal;

#[cfg(test)]
mod testing;
