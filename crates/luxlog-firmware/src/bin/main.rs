#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::SdCard;
use esp_hal::Async;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::timer::timg::TimerGroup;
use rtt_target::rprintln;
use static_cell::StaticCell;

use luxlog_core::config::LoggerConfig;
use luxlog_core::cycle::AcquisitionCycle;
use luxlog_firmware::i2c_bus::SharedI2cDevice;
use luxlog_firmware::rtc::Ds3231;
use luxlog_firmware::sd::SdCardStorage;
use luxlog_firmware::sensors::{Bh1750Light, Sht4xClimate};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

static I2C_BUS: StaticCell<Mutex<CriticalSectionRawMutex, I2c<'static, Async>>> = StaticCell::new();

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    rprintln!("Embassy initialized!");

    // One async I2C bus shared by the light sensor, the climate sensor,
    // and the RTC.
    let i2c = I2c::new(peripherals.I2C0, I2cConfig::default())
        .expect("Failed to initialize I2C bus")
        .with_sda(peripherals.GPIO8)
        .with_scl(peripherals.GPIO9)
        .into_async();
    let i2c_bus = I2C_BUS.init(Mutex::new(i2c));

    let light = Bh1750Light::new(SharedI2cDevice::new(i2c_bus));
    let climate = Sht4xClimate::new(SharedI2cDevice::new(i2c_bus));
    let clock = Ds3231::new(SharedI2cDevice::new(i2c_bus));

    // SPI bus for the SD card slot.
    let spi_bus = Spi::new(peripherals.SPI2, SpiConfig::default())
        .expect("Failed to initialize SPI bus")
        .with_sck(peripherals.GPIO36)
        .with_mosi(peripherals.GPIO37)
        .with_miso(peripherals.GPIO35);
    let cs = Output::new(peripherals.GPIO34, Level::High, OutputConfig::default());
    let spi_device =
        ExclusiveDevice::new_no_delay(spi_bus, cs).expect("Failed to wrap SPI device");
    let sd_card = SdCard::new(spi_device, embassy_time::Delay);

    let logger_config = LoggerConfig::default();
    let storage = SdCardStorage::new(sd_card, logger_config.mount_point);

    rprintln!("Hardware initialized, starting acquisition loop");

    AcquisitionCycle::new(storage, light, climate, clock, logger_config)
        .run()
        .await
}
