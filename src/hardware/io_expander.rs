//! I²C port expander driver (MAX7325 class)
//!
//! One chip provides the whole front panel: 8 active-low button inputs
//! behind one I²C address and 8 LED outputs behind another. Each access
//! is a single-byte transaction.

use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;

use crate::config::{BTN_ADDR, LED_ADDR};
use crate::error::{Error, Result};
use crate::pinmap::{BTNS_RELEASED, LEDS_OFF};

pub struct IoExpander {
    i2c: I2c<'static, I2C0, Async>,
}

impl IoExpander {
    pub fn new(i2c: I2c<'static, I2C0, Async>) -> Self {
        Self { i2c }
    }

    /// Wake the chip and put both ports in a known state: inputs
    /// released, LEDs dark. Must succeed before any task starts.
    pub async fn init(&mut self) -> Result<()> {
        self.i2c
            .write_async(BTN_ADDR as u16, [BTNS_RELEASED])
            .await
            .map_err(|_| Error::HardwareInit)?;
        self.i2c
            .write_async(LED_ADDR as u16, [LEDS_OFF])
            .await
            .map_err(|_| Error::HardwareInit)
    }

    /// Read the raw button byte (active low, `0xFF` = all released)
    pub async fn read_buttons(&mut self) -> Result<u8> {
        let mut state = [0u8; 1];
        self.i2c
            .read_async(BTN_ADDR as u16, &mut state)
            .await
            .map_err(|_| Error::I2cTransient)?;
        Ok(state[0])
    }

    /// Write the raw LED byte
    pub async fn write_leds(&mut self, pattern: u8) -> Result<()> {
        self.i2c
            .write_async(LED_ADDR as u16, [pattern])
            .await
            .map_err(|_| Error::I2cTransient)
    }
}
