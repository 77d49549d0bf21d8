//! Logical-to-physical pin maps for the scrambled expander wiring
//!
//! The board routes neither buttons nor LEDs in order, so every access
//! goes through a lookup. Buttons are active low: a released port reads
//! `0xFF` and a pressed button clears its bit.

pub const BUTTON_COUNT: u8 = 8;
pub const LED_COUNT: u8 = 8;

/// Raw input-port byte with every button released
pub const BTNS_RELEASED: u8 = 0xFF;

/// Raw output-port byte with every LED off
pub const LEDS_OFF: u8 = 0x00;

/// `BTN_MAP[logical] = physical pin`
pub const BTN_MAP: [u8; BUTTON_COUNT as usize] = [6, 4, 2, 1, 7, 5, 3, 0];

/// `LED_MAP[logical] = physical pin`
pub const LED_MAP: [u8; LED_COUNT as usize] = [0, 2, 5, 7, 1, 3, 4, 6];

/// Is a logical button pressed in a raw input-port byte?
pub fn is_pressed(btn: u8, raw: u8) -> bool {
    if btn >= BUTTON_COUNT {
        return false;
    }
    raw & (1 << BTN_MAP[btn as usize]) == 0
}

/// Is any button pressed in a raw input-port byte?
pub fn any_pressed(raw: u8) -> bool {
    raw != BTNS_RELEASED
}

/// Set a logical LED in an output-port pattern
pub fn led_on(led: u8, pattern: &mut u8) {
    if led < LED_COUNT {
        *pattern |= 1 << LED_MAP[led as usize];
    }
}

/// Clear a logical LED in an output-port pattern
pub fn led_off(led: u8, pattern: &mut u8) {
    if led < LED_COUNT {
        *pattern &= !(1 << LED_MAP[led as usize]);
    }
}

/// Pattern with the first `n` logical LEDs lit, used by the level intro
pub fn leds_up_to(n: u8) -> u8 {
    let mut pattern = LEDS_OFF;
    for led in 0..n.min(LED_COUNT) {
        led_on(led, &mut pattern);
    }
    pattern
}

/// Decode the logical LED lit by a single-bit pattern, if any
pub fn lit_led(pattern: u8) -> Option<u8> {
    if pattern.count_ones() != 1 {
        return None;
    }
    let pin = pattern.trailing_zeros() as u8;
    LED_MAP.iter().position(|&p| p == pin).map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_button_clears_its_mapped_bit() {
        // Logical button 3 sits on physical pin 1
        let raw = BTNS_RELEASED & !(1 << 1);
        assert!(is_pressed(3, raw));
        for other in [0, 1, 2, 4, 5, 6, 7] {
            assert!(!is_pressed(other, raw));
        }
    }

    #[test]
    fn released_port_reads_all_ones() {
        assert!(!any_pressed(BTNS_RELEASED));
        assert!(any_pressed(0xFE));
        for btn in 0..BUTTON_COUNT {
            assert!(!is_pressed(btn, BTNS_RELEASED));
        }
    }

    #[test]
    fn out_of_range_button_is_never_pressed() {
        assert!(!is_pressed(8, 0x00));
    }

    #[test]
    fn led_pattern_uses_physical_pins() {
        let mut pattern = LEDS_OFF;
        led_on(0, &mut pattern);
        assert_eq!(pattern, 0x01); // logical 0 -> pin 0
        led_on(3, &mut pattern);
        assert_eq!(pattern, 0x81); // logical 3 -> pin 7
        led_off(0, &mut pattern);
        assert_eq!(pattern, 0x80);
    }

    #[test]
    fn level_intro_pattern_counts_logical_leds() {
        // Logical 0..3 sit on pins 0, 2, 5
        assert_eq!(leds_up_to(3), 0b0010_0101);
        assert_eq!(leds_up_to(0), LEDS_OFF);
        assert_eq!(leds_up_to(8), 0xFF);
    }

    #[test]
    fn lit_led_roundtrips_single_patterns() {
        for led in 0..LED_COUNT {
            let mut pattern = LEDS_OFF;
            led_on(led, &mut pattern);
            assert_eq!(lit_led(pattern), Some(led));
        }
        assert_eq!(lit_led(LEDS_OFF), None);
        assert_eq!(lit_led(0b11), None);
    }
}
