use embassy_stm32::exti::ExtiInput;
use embassy_stm32::mode::Async;
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, Config as UsartConfig, RingBufferedUartRx, Uart, UartTx};
use embassy_stm32::{
    bind_interrupts,
    gpio::{Level, Output, Pull, Speed},
    i2c, peripherals, rcc, Config,
};
use static_cell::StaticCell;

use crate::config::{I2C_FREQUENCY_HZ, LINK_DMA_BUF_LEN, UART_BAUDRATE};

// ── IRQ table ─────────────────────────────────────────────
bind_interrupts!(pub struct Irqs {
    USART1 => usart::InterruptHandler<peripherals::USART1>;
    I2C2   => i2c::EventInterruptHandler<peripherals::I2C2>,
              i2c::ErrorInterruptHandler<peripherals::I2C2>;
});

static RADIO_DMA_BUF: StaticCell<[u8; LINK_DMA_BUF_LEN]> = StaticCell::new();

// ── Board struct ──────────────────────────────────────────
pub struct Board {
    /// UART to the BLE co-processor
    pub radio_tx: UartTx<'static, Async>,
    pub radio_rx: RingBufferedUartRx<'static>,
    /// LSM6DSL on I²C2 (DMA)
    pub imu_i2c: i2c::I2c<'static, Async>,
    /// LSM6DSL INT1, data-ready
    pub imu_int1: ExtiInput<'static>,
    pub led: Output<'static>,
}

impl Board {
    pub fn init() -> Result<Self, usart::ConfigError> {
        let mut config = Config::default();

        // HSI16 -> PLL -> 64 MHz SYSCLK
        config.rcc.hsi = Some(rcc::Hsi {
            sys_div: rcc::HsiSysDiv::DIV1,
        });
        config.rcc.pll = Some(rcc::Pll {
            source: rcc::PllSource::HSI,    // 16MHz
            prediv: rcc::PllPreDiv::DIV2,   // 8MHz
            mul: rcc::PllMul::MUL16,        // 128MHz
            divp: None,
            divq: None,
            divr: Some(rcc::PllRDiv::DIV2), // 64MHz
        });
        config.rcc.sys = rcc::Sysclk::PLL1_R;
        let p = embassy_stm32::init(config);

        let led = Output::new(p.PA5, Level::Low, Speed::Low);
        let imu_int1 = ExtiInput::new(p.PA0, p.EXTI0, Pull::Down);

        let mut us_cfg = UsartConfig::default();
        us_cfg.baudrate = UART_BAUDRATE;
        us_cfg.rx_pull = Pull::Up;

        let uart = Uart::new(p.USART1, p.PC5, p.PC4, Irqs, p.DMA1_CH2, p.DMA1_CH3, us_cfg)?;
        let (radio_tx, rx) = uart.split();
        // DMA-circular RX driver
        let radio_rx = rx.into_ring_buffered(RADIO_DMA_BUF.init([0; LINK_DMA_BUF_LEN]));

        // I²C2 (DMA CH7 TX, CH6 RX), external pull-ups on the sensor board
        let mut i2c_cfg = i2c::Config::default();
        i2c_cfg.sda_pullup = false;
        i2c_cfg.scl_pullup = false;

        let imu_i2c = i2c::I2c::new(
            p.I2C2,
            p.PB10,
            p.PB11,
            Irqs,
            p.DMA1_CH7,
            p.DMA1_CH6,
            Hertz(I2C_FREQUENCY_HZ),
            i2c_cfg,
        );

        Ok(Self {
            radio_tx,
            radio_rx,
            imu_i2c,
            imu_int1,
            led,
        })
    }
}
