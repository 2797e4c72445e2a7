//! Default GPIO / peripheral pin assignments for the Boxmon control board.
//!
//! These seed [`PinMap::default`](crate::config::PinMap).  A deployment
//! with a different harness overrides them in the config file rather than
//! editing this module.

// ---------------------------------------------------------------------------
// Relay board (active-low inputs: driving the line LOW closes the contact)
// ---------------------------------------------------------------------------

/// Irrigation pump relay.
pub const RELAY_PUMP_GPIO: u8 = 19;
/// Grow-light relay.
pub const RELAY_LIGHT_GPIO: u8 = 18;
/// Circulation fan relay.
pub const RELAY_FAN_GPIO: u8 = 5;

// ---------------------------------------------------------------------------
// Digital inputs
// ---------------------------------------------------------------------------

/// Reservoir float switch.  HIGH = water below the pump intake.
pub const WATER_LEVEL_GPIO: u8 = 13;
/// Autostart jumper, internal pull-up.  Grounded at boot = stay idle.
pub const AUTOSTART_GPIO: u8 = 32;

// ---------------------------------------------------------------------------
// Sensor buses
// ---------------------------------------------------------------------------

/// One-wire bus for the DS18B20 probe chain.
pub const ONEWIRE_GPIO: u8 = 4;
/// Primary I2C bus (BH1750 light, SHT3x climate, ADS1115 soil ADC).
pub const I2C0_SDA_GPIO: u8 = 21;
pub const I2C0_SCL_GPIO: u8 = 22;
