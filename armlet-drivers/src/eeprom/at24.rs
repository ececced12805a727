//! 24Cxx serial EEPROM
//!
//! Two-byte memory addressing, as used by the 24C32 through 24C512.
//! Writes are split so that no transfer crosses a page boundary; the
//! chip would otherwise wrap around inside the page. After each page the
//! chip goes deaf while it programs, which the driver waits out by
//! polling its address until it acknowledges again.
//!
//! # Usage
//!
//! ```ignore
//! let bus = TwoWireMaster::new(scl, sda, Delay, TwoWireConfig::STANDARD);
//! let mut eeprom = At24Store::new(bus, 32 * 1024, 64);
//! eeprom.write_block(DeviceAddress(0xA0), 0x0870, &bytes)?;
//! ```

use armlet_hal::{BidirectionalLine, ByteStore, DeviceAddress, OutputLine, StoreError};
use embedded_hal::delay::DelayNs;

use super::bus::{BusError, TwoWireMaster};

/// EEPROM behind a bit-banged bus
pub struct At24Store<SCL, SDA, D> {
    bus: TwoWireMaster<SCL, SDA, D>,
    capacity: u32,
    page_size: u16,
}

impl<SCL, SDA, D> At24Store<SCL, SDA, D>
where
    SCL: OutputLine,
    SDA: BidirectionalLine,
    D: DelayNs,
{
    /// Chip of `capacity` bytes with `page_size`-byte write pages
    pub fn new(bus: TwoWireMaster<SCL, SDA, D>, capacity: u32, page_size: u16) -> Self {
        Self {
            bus,
            capacity,
            page_size: page_size.max(1),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn bus(&self) -> &TwoWireMaster<SCL, SDA, D> {
        &self.bus
    }

    fn check_bounds(&self, offset: u16, len: usize) -> Result<(), StoreError> {
        if u32::from(offset) + len as u32 > self.capacity {
            return Err(StoreError::OutOfBounds);
        }
        Ok(())
    }

    /// Address the device for writing and set its memory pointer
    fn select(&mut self, device: DeviceAddress, offset: u16) -> Result<(), BusError> {
        self.bus.start();
        self.bus.write_byte(device.write_byte())?;
        let [hi, lo] = offset.to_be_bytes();
        self.bus.write_byte(hi)?;
        self.bus.write_byte(lo)
    }

    fn try_write_page(
        &mut self,
        device: DeviceAddress,
        offset: u16,
        data: &[u8],
    ) -> Result<(), BusError> {
        self.select(device, offset)?;
        for byte in data {
            self.bus.write_byte(*byte)?;
        }
        Ok(())
    }

    fn try_read(
        &mut self,
        device: DeviceAddress,
        offset: u16,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        self.select(device, offset)?;
        self.bus.start();
        self.bus.write_byte(device.read_byte())?;
        let last = buf.len().saturating_sub(1);
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.bus.read_byte(i != last);
        }
        Ok(())
    }

    /// Run `op` up to the configured number of attempts
    ///
    /// Every attempt, failed or not, ends with a stop condition so the
    /// bus is idle for the next one.
    fn with_retries<F>(&mut self, mut op: F) -> Result<(), StoreError>
    where
        F: FnMut(&mut Self) -> Result<(), BusError>,
    {
        let attempts = self.bus.config().retries.max(1);
        let mut result = Ok(());
        for _ in 0..attempts {
            result = op(self);
            self.bus.stop();
            if result.is_ok() {
                return Ok(());
            }
        }
        result.map_err(StoreError::from)
    }

    /// Write one page, retrying as configured
    ///
    /// An attempt that breaks off after some data bytes still leaves the
    /// chip programming what it latched, so later attempts first wait for
    /// that write cycle to end.
    fn write_page(
        &mut self,
        device: DeviceAddress,
        offset: u16,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let attempts = self.bus.config().retries.max(1);
        let mut result = Ok(());
        for attempt in 0..attempts {
            if attempt > 0 {
                let _ = self.wait_write_cycle(device);
            }
            result = self.try_write_page(device, offset, data);
            self.bus.stop();
            if result.is_ok() {
                break;
            }
        }
        result?;
        self.wait_write_cycle(device)
    }

    /// Poll the device address until the internal write cycle is over
    fn wait_write_cycle(&mut self, device: DeviceAddress) -> Result<(), StoreError> {
        for _ in 0..self.bus.config().write_cycle_polls {
            self.bus.start();
            let acked = self.bus.write_byte(device.write_byte()).is_ok();
            self.bus.stop();
            if acked {
                return Ok(());
            }
        }
        Err(StoreError::WriteTimeout)
    }
}

impl<SCL, SDA, D> ByteStore for At24Store<SCL, SDA, D>
where
    SCL: OutputLine,
    SDA: BidirectionalLine,
    D: DelayNs,
{
    fn write_block(
        &mut self,
        device: DeviceAddress,
        offset: u16,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.check_bounds(offset, data.len())?;

        let mut offset = offset;
        let mut rest = data;
        while !rest.is_empty() {
            let room = usize::from(self.page_size - offset % self.page_size);
            let (page, tail) = rest.split_at(room.min(rest.len()));

            self.write_page(device, offset, page)?;

            offset = offset.wrapping_add(page.len() as u16);
            rest = tail;
        }
        Ok(())
    }

    fn read_block(
        &mut self,
        device: DeviceAddress,
        offset: u16,
        buf: &mut [u8],
    ) -> Result<(), StoreError> {
        self.check_bounds(offset, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }
        self.with_retries(|eeprom| eeprom.try_read(device, offset, buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eeprom::sim::{CountingDelay, SimBus, SimLine};
    use armlet_hal::TwoWireConfig;

    const DEVICE: DeviceAddress = DeviceAddress(0xA0);

    fn eeprom(sim: &SimBus, capacity: u32) -> At24Store<SimLine, SimLine, CountingDelay> {
        let bus = TwoWireMaster::new(
            sim.scl(),
            sim.sda(),
            CountingDelay::default(),
            TwoWireConfig::STANDARD,
        );
        At24Store::new(bus, capacity, 64)
    }

    #[test]
    fn test_write_then_read() {
        let sim = SimBus::new(0xA0, 1024);
        let mut store = eeprom(&sim, 1024);

        store.write_block(DEVICE, 0x20, &[1, 2, 3, 4]).unwrap();
        assert_eq!(sim.contents(0x20, 4), vec![1, 2, 3, 4]);

        let mut buf = [0u8; 4];
        store.read_block(DEVICE, 0x20, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_write_split_at_page_boundary() {
        let sim = SimBus::new(0xA0, 1024);
        let mut store = eeprom(&sim, 1024);

        let data: std::vec::Vec<u8> = (0..100u8).collect();
        store.write_block(DEVICE, 50, &data).unwrap();

        // 14 bytes up to 64, a full page, then 22 bytes
        assert_eq!(sim.commits(), 3);
        assert_eq!(sim.contents(50, 100), data);
        assert_eq!(sim.contents(0, 50), vec![0xFF; 50]);
    }

    #[test]
    fn test_waits_out_write_cycle() {
        let sim = SimBus::new(0xA0, 1024);
        sim.set_write_cycle(5);
        let mut store = eeprom(&sim, 1024);

        store.write_block(DEVICE, 0, &[0xAB; 70]).unwrap();
        let mut buf = [0u8; 70];
        store.read_block(DEVICE, 0, &mut buf).unwrap();
        assert_eq!(buf, [0xAB; 70]);
    }

    #[test]
    fn test_write_cycle_timeout() {
        let sim = SimBus::new(0xA0, 1024);
        sim.set_write_cycle(1_000);
        let mut store = eeprom(&sim, 1024);

        assert_eq!(
            store.write_block(DEVICE, 0, &[0x01]),
            Err(StoreError::WriteTimeout)
        );
    }

    #[test]
    fn test_broken_off_write_retried_after_write_cycle() {
        let sim = SimBus::new(0xA0, 1024);
        sim.set_write_cycle(5);
        sim.nack_data_once(2);
        let mut store = eeprom(&sim, 1024);

        store.write_block(DEVICE, 0x10, &[1, 2, 3, 4]).unwrap();
        // The broken-off attempt programmed its first two bytes
        assert_eq!(sim.commits(), 2);
        assert_eq!(sim.contents(0x10, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_absent_device_retried_then_reported() {
        let sim = SimBus::new(0xA0, 1024);
        let mut store = eeprom(&sim, 1024);

        let mut buf = [0u8; 8];
        assert_eq!(
            store.read_block(DeviceAddress(0xA2), 0, &mut buf),
            Err(StoreError::NoAcknowledge)
        );
        assert_eq!(sim.starts(), u32::from(TwoWireConfig::STANDARD.retries));
    }

    #[test]
    fn test_out_of_bounds_never_touches_bus() {
        let sim = SimBus::new(0xA0, 1024);
        let mut store = eeprom(&sim, 1024);

        assert_eq!(
            store.write_block(DEVICE, 1020, &[0; 8]),
            Err(StoreError::OutOfBounds)
        );
        let mut buf = [0u8; 2];
        assert_eq!(
            store.read_block(DEVICE, 1024, &mut buf),
            Err(StoreError::OutOfBounds)
        );
        assert_eq!(sim.starts(), 0);
    }

    #[test]
    fn test_erased_reads_back_ff() {
        let sim = SimBus::new(0xA0, 1024);
        let mut store = eeprom(&sim, 1024);

        let mut buf = [0u8; 32];
        store.read_block(DEVICE, 0x100, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 32]);
    }
}
