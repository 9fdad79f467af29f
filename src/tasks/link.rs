use defmt::*;
use embassy_executor::task;
use embassy_stm32::mode::Async;
use embassy_stm32::usart::{RingBufferedUartRx, UartTx};
use embedded_io_async::Write;

use crate::ipc::{LINK_EVENT_CH, LINK_TX_CH};
use crate::link::{LinkDecoder, LINK_MAX_FRAME};

#[task]
pub async fn link_rx_task(mut rx: RingBufferedUartRx<'static>) {
    info!("Link RX task started");
    let mut decoder = LinkDecoder::new();
    let mut buf = [0u8; 64];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    decoder.push(byte);
                    while let Some(event) = decoder.poll() {
                        LINK_EVENT_CH.send(event).await;
                    }
                }
            }
            Err(e) => warn!("Link RX error: {:?}", e),
        }
    }
}

#[task]
pub async fn link_tx_task(mut tx: UartTx<'static, Async>) {
    info!("Link TX task started");
    let mut frame = [0u8; LINK_MAX_FRAME];
    let mut seq = 0u8;
    let mut errors = 0u32;

    loop {
        let msg = LINK_TX_CH.receive().await;
        let len = msg.encode(seq, &mut frame);
        seq = seq.wrapping_add(1);

        if let Err(e) = tx.write_all(&frame[..len]).await {
            errors += 1;
            warn!("Link TX error #{}: {:?}", errors, e);
        }
    }
}
