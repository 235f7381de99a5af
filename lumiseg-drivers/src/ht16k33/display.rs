//! HT16K33 refresh driver
//!
//! Owns the bus handle, the display buffer and the runtime state of one
//! display. The host calls [`Ht16k33::init`] once, then [`Ht16k33::tick`]
//! every `update_interval_ms` from whatever timer it has; the driver never
//! waits on its own.
//!
//! Each tick renders, resolves the brightness, sends a dimming command only
//! when the brightness changed, and always sends the complete display RAM.
//! A failed bus write is recorded and the next tick simply tries again with
//! fresh content.

use core::fmt;

use lumiseg_core::{
    AmbientSensor, ConfigError, DeviceConfig, DisplayBuffer, Event, FaultKind, IntensityCode,
    IntensityResolver, NoRender, NoSensor, Render, Resolution, State,
};
use lumiseg_hal::{I2cBus, I2cError};

use super::command::Command;
use super::layout::{RamLayout, SevenSegment4};

/// Driver for the 4-digit 7-segment backpack
pub type SevenSegmentDisplay<I2C, S = NoSensor, R = NoRender> =
    Ht16k33<I2C, SevenSegment4, 4, S, R>;

/// Runtime bookkeeping, reset only by reconstructing the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// Brightness the chip last acknowledged
    pub last_sent_intensity: Option<IntensityCode>,
    /// Timestamp passed to the last refreshing tick
    pub last_refresh_ms: Option<u64>,
    /// Result of the last tick's bus traffic
    pub last_bus_result: Result<(), I2cError>,
    /// Refreshing ticks so far
    pub ticks: u32,
    /// Refreshing ticks with at least one failed write
    pub bus_failures: u32,
}

impl DeviceState {
    const fn new() -> Self {
        Self {
            last_sent_intensity: None,
            last_refresh_ms: None,
            last_bus_result: Ok(()),
            ticks: 0,
            bus_failures: 0,
        }
    }
}

/// Initialization failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// A power-up command was not acknowledged; the driver is now faulted
    Bus {
        /// Which step failed
        step: FaultKind,
        /// Bus error reported
        error: I2cError,
    },
    /// `init` called outside `Uninitialized`
    InvalidState(State),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Bus { step, error } => {
                write!(f, "initialization failed at {:?}: {}", step, error)
            }
            InitError::InvalidState(state) => write!(f, "cannot initialize from {:?}", state),
        }
    }
}

/// What a tick did on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Every write went through
    Sent,
    /// At least one write failed; retried next tick
    BusError(I2cError),
    /// Not running; nothing sent
    Skipped(State),
}

/// Summary of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Bus result
    pub outcome: TickOutcome,
    /// Brightness resolved for this tick (not for skipped ticks)
    pub intensity: Option<Resolution>,
    /// A dimming command was acknowledged this tick
    pub brightness_sent: bool,
}

impl TickReport {
    const fn skipped(state: State) -> Self {
        Self {
            outcome: TickOutcome::Skipped(state),
            intensity: None,
            brightness_sent: false,
        }
    }
}

/// HT16K33 display with periodic refresh
///
/// - `I2C`: bus the chip sits on
/// - `L`: RAM layout of the backpack, `N` digit positions
/// - `S`: ambient sensor for derived brightness
/// - `R`: rendering callback
pub struct Ht16k33<I2C, L, const N: usize, S = NoSensor, R = NoRender> {
    bus: I2C,
    layout: L,
    config: DeviceConfig,
    sensor: S,
    renderer: Option<R>,
    buffer: DisplayBuffer<N>,
    resolver: IntensityResolver,
    state: State,
    device: DeviceState,
}

impl<I2C, L, const N: usize> Ht16k33<I2C, L, N, NoSensor, NoRender>
where
    I2C: I2cBus,
    L: RamLayout<N>,
{
    /// Create a driver with fixed brightness
    ///
    /// Fails with [`ConfigError::MissingSensor`] if the configuration asks
    /// for sensor-derived brightness.
    pub fn new(bus: I2C, layout: L, config: DeviceConfig) -> Result<Self, ConfigError> {
        if config.is_derived() {
            return Err(ConfigError::MissingSensor);
        }
        Ok(Self::assemble(bus, layout, config, NoSensor))
    }
}

impl<I2C, L, const N: usize, S> Ht16k33<I2C, L, N, S, NoRender>
where
    I2C: I2cBus,
    L: RamLayout<N>,
    S: AmbientSensor,
{
    /// Create a driver reading `sensor` for derived brightness
    pub fn with_sensor(bus: I2C, layout: L, config: DeviceConfig, sensor: S) -> Self {
        Self::assemble(bus, layout, config, sensor)
    }
}

impl<I2C, L, const N: usize, S, R> Ht16k33<I2C, L, N, S, R>
where
    I2C: I2cBus,
    L: RamLayout<N>,
    S: AmbientSensor,
    R: Render<N>,
{
    fn assemble(bus: I2C, layout: L, config: DeviceConfig, sensor: S) -> Self {
        Self {
            bus,
            layout,
            config,
            sensor,
            renderer: None,
            buffer: DisplayBuffer::new(),
            resolver: IntensityResolver::new(),
            state: State::Uninitialized,
            device: DeviceState::new(),
        }
    }

    /// Attach a rendering callback, invoked on a blank buffer every tick
    pub fn with_renderer<R2: Render<N>>(self, renderer: R2) -> Ht16k33<I2C, L, N, S, R2> {
        Ht16k33 {
            bus: self.bus,
            layout: self.layout,
            config: self.config,
            sensor: self.sensor,
            renderer: Some(renderer),
            buffer: self.buffer,
            resolver: self.resolver,
            state: self.state,
            device: self.device,
        }
    }

    /// Power-up sequence: oscillator on, display on, initial brightness
    ///
    /// Any failure faults the driver for good; build a new one to retry.
    pub fn init(&mut self) -> Result<(), InitError> {
        if self.state != State::Uninitialized {
            return Err(InitError::InvalidState(self.state));
        }
        self.state = self.state.transition(Event::Begin);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "HT16K33 @ {=u8:#x}: interval={}ms inverted={} blink={} intensity={}",
            self.config.address,
            self.config.update_interval_ms,
            self.config.inverted,
            self.config.blink,
            self.config.intensity
        );

        match self.power_up() {
            Ok(code) => {
                self.device.last_sent_intensity = Some(code);
                self.state = self.state.transition(Event::InitSucceeded);
                Ok(())
            }
            Err((step, error)) => {
                #[cfg(feature = "defmt")]
                defmt::error!("HT16K33 init failed at {}: {}", step, error);

                self.device.last_bus_result = Err(error);
                self.state = self.state.transition(Event::InitFailed(step));
                Err(InitError::Bus { step, error })
            }
        }
    }

    /// One refresh cycle
    ///
    /// `now_ms` is the host's monotonic time, only recorded. Does nothing
    /// unless the driver is running.
    pub fn tick(&mut self, now_ms: u64) -> TickReport {
        if !self.state.refreshes() {
            return TickReport::skipped(self.state);
        }

        if let Some(renderer) = self.renderer.as_mut() {
            self.buffer.clear();
            renderer.render(&mut self.buffer);
        }
        let frame = if self.config.inverted {
            self.buffer.rotated()
        } else {
            self.buffer
        };

        let resolution = self.resolver.resolve(&self.config.intensity, &mut self.sensor);

        #[cfg(feature = "defmt")]
        if resolution.origin == lumiseg_core::ResolutionOrigin::Fallback {
            defmt::debug!("No sensor value yet, using fallback {}", resolution.code);
        }

        let mut failure = None;
        let mut brightness_sent = false;

        if self.device.last_sent_intensity != Some(resolution.code) {
            match self.send(&Command::brightness(resolution.code)) {
                Ok(()) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!(
                        "Intensity {} -> {} ({})",
                        self.device.last_sent_intensity,
                        resolution.code,
                        resolution.origin
                    );
                    self.device.last_sent_intensity = Some(resolution.code);
                    brightness_sent = true;
                }
                Err(error) => failure = Some(error),
            }
        }

        let ram = Command::write_buffer(&self.layout, &frame);
        if let Err(error) = self.send(&ram) {
            failure = Some(error);
        }

        self.device.ticks = self.device.ticks.wrapping_add(1);
        self.device.last_refresh_ms = Some(now_ms);

        let outcome = match failure {
            None => {
                self.device.last_bus_result = Ok(());
                TickOutcome::Sent
            }
            Some(error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("HT16K33 refresh failed: {}", error);

                self.device.bus_failures = self.device.bus_failures.wrapping_add(1);
                self.device.last_bus_result = Err(error);
                TickOutcome::BusError(error)
            }
        };

        TickReport {
            outcome,
            intensity: Some(resolution),
            brightness_sent,
        }
    }

    /// Stop refreshing; buffer and brightness mode are kept
    pub fn suspend(&mut self) -> State {
        self.apply(Event::Suspend)
    }

    /// Refresh again from the next tick
    pub fn resume(&mut self) -> State {
        self.apply(Event::Resume)
    }

    /// Whether a refresh period has elapsed since the last refresh
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.device.last_refresh_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= u64::from(self.config.update_interval_ms),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// Runtime bookkeeping
    pub fn device_state(&self) -> &DeviceState {
        &self.device
    }

    /// Configuration in use
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Buffer as last rendered (before inversion)
    pub fn buffer(&self) -> &DisplayBuffer<N> {
        &self.buffer
    }

    /// Buffer for hosts without a rendering callback
    ///
    /// With a renderer attached, changes are overwritten on the next tick.
    pub fn buffer_mut(&mut self) -> &mut DisplayBuffer<N> {
        &mut self.buffer
    }

    /// The ambient sensor
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Tear down and give back the bus
    pub fn release(self) -> I2C {
        self.bus
    }

    fn power_up(&mut self) -> Result<IntensityCode, (FaultKind, I2cError)> {
        self.send(&Command::oscillator(true))
            .map_err(|error| (FaultKind::OscillatorFailed, error))?;

        let setup = Command::display_setup(true, self.config.blink);
        self.send(&setup)
            .map_err(|error| (FaultKind::DisplaySetupFailed, error))?;

        let resolution = self.resolver.resolve(&self.config.intensity, &mut self.sensor);
        self.send(&Command::brightness(resolution.code))
            .map_err(|error| (FaultKind::BrightnessFailed, error))?;

        Ok(resolution.code)
    }

    fn apply(&mut self, event: Event) -> State {
        let next = self.state.transition(event);

        #[cfg(feature = "defmt")]
        if next != self.state {
            defmt::info!("HT16K33 {} -> {}", self.state, next);
        }

        self.state = next;
        next
    }

    fn send(&mut self, command: &Command) -> Result<(), I2cError> {
        self.bus
            .write(self.config.address, command.bytes())
            .map_err(Into::into)
    }
}
