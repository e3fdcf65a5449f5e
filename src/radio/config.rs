//! Modulation and packet configuration
//!
//! Each setter programs the corresponding register field and records the
//! value in [`RadioConfig`](crate::RadioConfig). Out-of-range arguments are
//! clamped to the nearest value the chip supports.

use embedded_hal::digital::OutputPin;

use crate::config::{HeaderType, PaPin, RxGain};
use crate::registers::*;
use crate::{Clock, Error, Radio};

/// Bandwidth steps in Hz and the upper bound of the range mapped to each
const BANDWIDTHS: [(u32, u8); 9] = [
    (9_100, 0),   // 7.8 kHz
    (13_000, 1),  // 10.4 kHz
    (18_200, 2),  // 15.6 kHz
    (26_000, 3),  // 20.8 kHz
    (36_500, 4),  // 31.25 kHz
    (52_100, 5),  // 41.7 kHz
    (93_800, 6),  // 62.5 kHz
    (187_500, 7), // 125 kHz
    (375_000, 8), // 250 kHz
];

impl<SPI, CLK, TXEN, RXEN> Radio<SPI, CLK, TXEN, RXEN>
where
    SPI: embedded_hal::spi::SpiDevice,
    CLK: Clock,
    TXEN: OutputPin,
    RXEN: OutputPin,
{
    /// Selects the modem. Passes through sleep, as the modem can only be
    /// changed there, and ends in standby.
    pub fn set_modem(&mut self, modem: Modem) -> Result<(), Error> {
        self.config.modem = modem;
        self.sleep()?;
        self.standby()
    }

    /// Sets the carrier frequency in Hz.
    pub fn set_frequency(&mut self, frequency: u32) -> Result<(), Error> {
        self.config.frequency = frequency;
        // Fstep = 32 MHz / 2^19
        let frf = ((frequency as u64) << 19) / 32_000_000;
        self.device.write(REG_FRF_MSB, (frf >> 16) as u8)?;
        self.device.write(REG_FRF_MID, (frf >> 8) as u8)?;
        self.device.write(REG_FRF_LSB, frf as u8)
    }

    /// Sets the transmit power in dBm on the given PA pin.
    ///
    /// # Important Notes
    /// - RFO is limited to 14 dBm
    /// - PA_BOOST covers 2 to 20 dBm; above 17 dBm the high power DAC is
    ///   enabled and over-current protection lowered to 100 mA
    pub fn set_tx_power(&mut self, dbm: u8, pa_pin: PaPin) -> Result<(), Error> {
        let (pa_config, output_power) = match pa_pin {
            PaPin::Rfo => {
                let dbm = dbm.min(14);
                if dbm == 14 {
                    // Pmax 14.4 dBm
                    (0x60, dbm + 1)
                } else {
                    // Pmax 13.2 dBm
                    (0x40, dbm + 2)
                }
            }
            PaPin::PaBoost => {
                let dbm = dbm.min(20);
                let (pa_dac, output_power) = if dbm > 17 {
                    self.set_current_protection(100)?;
                    (0x07, 15)
                } else {
                    self.set_current_protection(140)?;
                    (0x04, dbm.max(2) - 2)
                };
                self.device.write(REG_PA_DAC, pa_dac)?;
                (0xC0, output_power)
            }
        };
        self.device.write(REG_PA_CONFIG, pa_config | output_power)
    }

    /// Enables over-current protection at the given limit in mA.
    pub fn set_current_protection(&mut self, milliamps: u8) -> Result<(), Error> {
        let trim = match milliamps {
            0..=45 => 0,
            46..=120 => (milliamps - 45) / 5,
            121..=240 => ((milliamps as u16 + 30) / 10) as u8,
            _ => 27,
        };
        self.device.write(REG_OCP, 0x20 | trim)
    }

    /// Selects the reference oscillator.
    pub fn set_oscillator(&mut self, oscillator: Oscillator) -> Result<(), Error> {
        self.device.write_register(Tcxo(oscillator))
    }

    /// Sets the LNA gain and high-frequency LNA boost.
    pub fn set_rx_gain(&mut self, gain: RxGain, boost: bool) -> Result<(), Error> {
        let (step, agc) = match gain {
            RxGain::Auto => (0, true),
            RxGain::Fixed(step) => (step.clamp(1, 6), false),
        };
        let boost = if boost { 0x03 } else { 0x00 };
        self.device.write(REG_LNA, boost | (step << 5))?;
        self.device.write_bits(REG_MODEM_CONFIG_3, agc as u8, 2, 1)
    }

    /// Sets all LoRa modulation parameters at once.
    pub fn set_lora_modulation(
        &mut self,
        spreading_factor: u8,
        bandwidth: u32,
        coding_rate: u8,
        ldro: bool,
    ) -> Result<(), Error> {
        self.set_spreading_factor(spreading_factor)?;
        self.set_bandwidth(bandwidth)?;
        self.set_code_rate(coding_rate)?;
        self.set_ldro_enable(ldro)
    }

    /// Sets the spreading factor, 6 to 12.
    ///
    /// SF6 needs its own detection optimize and threshold settings and only
    /// works in implicit header mode.
    pub fn set_spreading_factor(&mut self, spreading_factor: u8) -> Result<(), Error> {
        let sf = spreading_factor.clamp(6, 12);
        self.config.spreading_factor = sf;

        let (optimize, threshold) = if sf == 6 { (0x05, 0x0C) } else { (0x03, 0x0A) };
        self.device.write(REG_DETECTION_OPTIMIZE, optimize)?;
        self.device.write(REG_DETECTION_THRESHOLD, threshold)?;
        self.device.write_bits(REG_MODEM_CONFIG_2, sf, 4, 4)
    }

    /// Sets the bandwidth in Hz, rounded to the nearest supported step
    /// between 7.8 kHz and 500 kHz.
    pub fn set_bandwidth(&mut self, bandwidth: u32) -> Result<(), Error> {
        self.config.bandwidth = bandwidth;
        let setting = BANDWIDTHS
            .iter()
            .find(|(limit, _)| bandwidth < *limit)
            .map_or(9, |(_, setting)| *setting);
        self.device.write_bits(REG_MODEM_CONFIG_1, setting, 4, 4)
    }

    /// Sets the coding rate denominator, 5 (4/5) to 8 (4/8).
    pub fn set_code_rate(&mut self, coding_rate: u8) -> Result<(), Error> {
        let cr = coding_rate.clamp(5, 8);
        self.config.coding_rate = cr;
        self.device.write_bits(REG_MODEM_CONFIG_1, cr - 4, 1, 3)
    }

    /// Enables or disables low data rate optimization.
    pub fn set_ldro_enable(&mut self, ldro: bool) -> Result<(), Error> {
        self.config.ldro = ldro;
        self.device.write_bits(REG_MODEM_CONFIG_3, ldro as u8, 3, 1)
    }

    /// Sets all LoRa packet parameters at once.
    pub fn set_lora_packet(
        &mut self,
        header_type: HeaderType,
        preamble_length: u16,
        payload_length: u8,
        crc: bool,
        invert_iq: bool,
    ) -> Result<(), Error> {
        self.set_header_type(header_type)?;
        self.set_preamble_length(preamble_length)?;
        self.set_payload_length(payload_length)?;
        self.set_crc_enable(crc)?;
        self.set_invert_iq(invert_iq)
    }

    /// Selects explicit or implicit header mode.
    pub fn set_header_type(&mut self, header_type: HeaderType) -> Result<(), Error> {
        self.config.header_type = header_type;
        self.device
            .write_bits(REG_MODEM_CONFIG_1, header_type as u8, 0, 1)
    }

    /// Sets the preamble length in symbols.
    pub fn set_preamble_length(&mut self, preamble_length: u16) -> Result<(), Error> {
        self.config.preamble_length = preamble_length;
        let [msb, lsb] = preamble_length.to_be_bytes();
        self.device.write(REG_PREAMBLE_MSB, msb)?;
        self.device.write(REG_PREAMBLE_LSB, lsb)
    }

    /// Sets the payload length expected in implicit header mode.
    pub fn set_payload_length(&mut self, payload_length: u8) -> Result<(), Error> {
        self.config.payload_length = payload_length;
        self.device.write_register(PayloadLength(payload_length))
    }

    /// Enables or disables payload CRC.
    pub fn set_crc_enable(&mut self, crc: bool) -> Result<(), Error> {
        self.config.crc = crc;
        self.device.write_bits(REG_MODEM_CONFIG_2, crc as u8, 2, 1)
    }

    /// Enables or disables I/Q inversion.
    pub fn set_invert_iq(&mut self, invert_iq: bool) -> Result<(), Error> {
        self.config.invert_iq = invert_iq;
        let (bit, iq2) = if invert_iq { (1, 0x19) } else { (0, 0x1D) };
        self.device.write_bits(REG_INVERT_IQ, bit, 0, 1)?;
        self.device.write_bits(REG_INVERT_IQ, bit, 6, 1)?;
        self.device.write(REG_INVERT_IQ2, iq2)
    }

    /// Sets the LoRa sync word. 0x12 for private networks, 0x34 for LoRaWAN.
    pub fn set_sync_word(&mut self, sync_word: u8) -> Result<(), Error> {
        self.device.write(REG_SYNC_WORD, sync_word)
    }
}
