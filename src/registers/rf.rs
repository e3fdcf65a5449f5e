//! RF-related registers
//!
//! This module contains registers related to RF configuration including:
//! - Carrier frequency
//! - Power amplifier and over-current protection
//! - LNA gain
//! - LoRa modulation and packet format
//!
//! These registers are written as raw bit fields by the configuration
//! setters, so they are listed by address.

/// Carrier frequency, bits 23:16 (address: 0x06)
pub const REG_FRF_MSB: u8 = 0x06;
/// Carrier frequency, bits 15:8 (address: 0x07)
pub const REG_FRF_MID: u8 = 0x07;
/// Carrier frequency, bits 7:0 (address: 0x08)
pub const REG_FRF_LSB: u8 = 0x08;

/// PA selection and output power (address: 0x09)
///
/// - Bit 7: PaSelect (0 = RFO, 1 = PA_BOOST)
/// - Bits 6:4: MaxPower
/// - Bits 3:0: OutputPower
pub const REG_PA_CONFIG: u8 = 0x09;

/// Over-current protection (address: 0x0B)
///
/// - Bit 5: OcpOn
/// - Bits 4:0: OcpTrim
pub const REG_OCP: u8 = 0x0B;

/// LNA settings (address: 0x0C)
///
/// - Bits 7:5: LnaGain (1 = max gain, 6 = min gain)
/// - Bits 1:0: LnaBoostHf
pub const REG_LNA: u8 = 0x0C;

/// Modem PHY config 1 (address: 0x1D)
///
/// - Bits 7:4: Bandwidth
/// - Bits 3:1: CodingRate
/// - Bit 0: ImplicitHeaderModeOn
pub const REG_MODEM_CONFIG_1: u8 = 0x1D;

/// Modem PHY config 2 (address: 0x1E)
///
/// - Bits 7:4: SpreadingFactor
/// - Bit 2: RxPayloadCrcOn
/// - Bits 1:0: SymbTimeout(9:8)
pub const REG_MODEM_CONFIG_2: u8 = 0x1E;

/// Preamble length, MSB (address: 0x20)
pub const REG_PREAMBLE_MSB: u8 = 0x20;
/// Preamble length, LSB (address: 0x21)
pub const REG_PREAMBLE_LSB: u8 = 0x21;

/// Modem PHY config 3 (address: 0x26)
///
/// - Bit 3: LowDataRateOptimize
/// - Bit 2: AgcAutoOn
pub const REG_MODEM_CONFIG_3: u8 = 0x26;

/// LoRa detection optimize (address: 0x31)
pub const REG_DETECTION_OPTIMIZE: u8 = 0x31;

/// I/Q inversion (address: 0x33)
pub const REG_INVERT_IQ: u8 = 0x33;

/// LoRa detection threshold (address: 0x37)
pub const REG_DETECTION_THRESHOLD: u8 = 0x37;

/// LoRa sync word (address: 0x39)
pub const REG_SYNC_WORD: u8 = 0x39;

/// I/Q inversion, second register (address: 0x3B)
pub const REG_INVERT_IQ2: u8 = 0x3B;

/// High power PA settings (address: 0x4D)
///
/// 0x04 = default, 0x07 = +20 dBm on PA_BOOST
pub const REG_PA_DAC: u8 = 0x4D;
