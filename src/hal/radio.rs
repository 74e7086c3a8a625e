//! Radio capability consumed by the receiver arbitration and radio
//! parameter logic.

/// Register-level access to the radio.
///
/// All methods are single strobes or register writes; none of them block.
pub trait RadioControl {
    /// Strobe the receiver on.
    fn rx_on(&self);

    /// Strobe the radio off (stops both receive and transmit).
    fn rxtx_off(&self);

    /// Discard everything in the receive FIFO.
    fn flush_rx_fifo(&self);

    /// Clear a pending receive-threshold interrupt flag.
    fn clear_rx_threshold_interrupt(&self);

    /// Enable the receive-threshold interrupt.
    fn enable_rx_threshold_interrupt(&self);

    /// Tune to an 802.15.4 channel number.
    fn set_channel(&self, channel: u8);

    /// Write the transmit power register.
    fn set_tx_power(&self, register_value: u8);

    fn set_pan_coordinator(&self, pan_coordinator: bool);
    fn set_pan_id(&self, pan_id: u16);
    fn set_short_addr(&self, short_addr: u16);

    /// Write the extended address, least significant byte first.
    fn set_ieee_addr(&self, ieee_addr: &[u8; 8]);

    /// Instantaneous RSSI register value.
    fn rssi(&self) -> i8;

    /// Put the receiver in infinite reception so the ADC produces noise.
    fn enter_noise_sampling(&self);

    /// One bit of receiver ADC noise; only valid while noise sampling.
    fn noise_bit(&self) -> bool;

    /// Leave infinite reception and turn the receiver back off.
    fn exit_noise_sampling(&self);

    /// Debug indicator mirroring the receiver state (an LED on boards that
    /// have one).
    fn rx_indicator(&self, _on: bool) {}
}
