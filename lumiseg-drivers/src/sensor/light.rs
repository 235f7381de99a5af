//! Ambient light sensor on an ADC channel
//!
//! A photoresistor or phototransistor in a voltage divider, read as a
//! percentage of full scale (0.0 = dark, 100.0 = bright). Calibration
//! tables for derived brightness are written against that percentage.
//!
//! Circuit (`dark_high = false`):
//! VCC -- sensor -- ADC_PIN -- resistor -- GND

use lumiseg_core::AmbientSensor;

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read one raw conversion
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

impl<T: AdcReader + ?Sized> AdcReader for &mut T {
    fn read(&mut self) -> Result<u16, ()> {
        T::read(self)
    }
}

/// Raw ADC value to light percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LightScale {
    /// Highest raw value (4095 for 12-bit)
    pub full_scale: u16,
    /// Divider wired so that darkness reads high
    pub dark_high: bool,
}

impl Default for LightScale {
    fn default() -> Self {
        Self {
            full_scale: 4095,
            dark_high: false,
        }
    }
}

impl LightScale {
    /// Percentage of full scale, clamped to 0..=100
    pub fn percent(&self, raw: u16) -> f32 {
        if self.full_scale == 0 {
            return 0.0;
        }
        let raw = raw.min(self.full_scale);
        let pct = raw as f32 * 100.0 / self.full_scale as f32;
        if self.dark_high {
            100.0 - pct
        } else {
            pct
        }
    }
}

/// Light sensor reading an ADC on demand
///
/// Each call to [`AdcLightSensor::sample`] averages `oversample` raw
/// conversions. A failed conversion discards the whole sample.
/// As an [`AmbientSensor`] it reports the result of the latest sample
/// without touching the ADC.
pub struct AdcLightSensor<ADC> {
    adc: ADC,
    scale: LightScale,
    oversample: u8,
    last: Option<f32>,
}

impl<ADC: AdcReader> AdcLightSensor<ADC> {
    /// Create a sensor with a 12-bit scale and no oversampling
    pub fn new(adc: ADC) -> Self {
        Self {
            adc,
            scale: LightScale::default(),
            oversample: 1,
            last: None,
        }
    }

    /// Override the scale
    pub fn with_scale(mut self, scale: LightScale) -> Self {
        self.scale = scale;
        self
    }

    /// Average `count` conversions per sample (0 is treated as 1)
    pub fn with_oversample(mut self, count: u8) -> Self {
        self.oversample = count.max(1);
        self
    }

    /// Scale in use
    pub fn scale(&self) -> LightScale {
        self.scale
    }

    /// Take one sample, `None` if any conversion failed
    ///
    /// The result is kept as the sensor's current value.
    pub fn sample(&mut self) -> Option<f32> {
        self.last = self.convert();
        self.last
    }

    /// Result of the latest [`sample`](Self::sample)
    pub fn last_sample(&self) -> Option<f32> {
        self.last
    }

    fn convert(&mut self) -> Option<f32> {
        let mut sum: u32 = 0;
        for _ in 0..self.oversample {
            match self.adc.read() {
                Ok(raw) => sum += u32::from(raw),
                Err(()) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Light sensor conversion failed");
                    return None;
                }
            }
        }
        let avg = sum / u32::from(self.oversample);
        Some(self.scale.percent(avg.min(u32::from(u16::MAX)) as u16))
    }

    /// Give back the ADC
    pub fn release(self) -> ADC {
        self.adc
    }
}

impl<ADC: AdcReader> AmbientSensor for AdcLightSensor<ADC> {
    fn current_value(&mut self) -> Option<f32> {
        self.last
    }
}

/// Fixed-sequence ADC for testing
#[cfg(test)]
pub struct ScriptedAdc(pub std::vec::Vec<Result<u16, ()>>);

#[cfg(test)]
impl AdcReader for ScriptedAdc {
    fn read(&mut self) -> Result<u16, ()> {
        if self.0.is_empty() {
            Err(())
        } else {
            self.0.remove(0)
        }
    }
}
