//! Companion-app peripheral: advertise, hold the connection, watch for loss.

use core::mem;

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::peripheral;
use nrf_softdevice::{raw, Softdevice};

use standby_watch::ble::adv::build_advertisement;
use standby_watch::config::{BLE_ADV_INTERVAL, BLE_LINK_CHECK_MS, DEVICE_NAME};
use standby_watch::error::{BleError, Error};

use super::{BleEvent, BLE_COMMANDS, BLE_EVENTS};

/// Pause before re-advertising after a failed attempt.
const ADVERTISE_RETRY: Duration = Duration::from_secs(1);

/// SoftDevice configuration: one peripheral link, LF clock from the RC oscillator.
pub fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 247 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::task]
pub async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Advertise, serve one phone at a time, and forward link state to the UI.
#[embassy_executor::task]
pub async fn companion_task(sd: &'static Softdevice) -> ! {
    let adv_data = match build_advertisement(DEVICE_NAME) {
        Ok(data) => data,
        Err(e) => {
            defmt::error!("Advertising payload rejected: {}", e);
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        }
    };
    let config = peripheral::Config {
        interval: BLE_ADV_INTERVAL,
        ..Default::default()
    };

    loop {
        info!("Advertising as {}", DEVICE_NAME);
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv_data,
            scan_data: &[],
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                let err = Error::from(BleError::AdvertiseFailed);
                warn!("{}: {}", err, e);
                Timer::after(ADVERTISE_RETRY).await;
                continue;
            }
        };

        info!("Phone connected");
        BLE_EVENTS.send(BleEvent::Connected).await;

        while conn.handle().is_some() {
            match select(
                BLE_COMMANDS.receive(),
                Timer::after(Duration::from_millis(BLE_LINK_CHECK_MS)),
            )
            .await
            {
                Either::First(command) => info!("To phone: {}", command),
                Either::Second(()) => {}
            }
        }

        info!("Phone disconnected");
        BLE_EVENTS.send(BleEvent::Disconnected).await;
    }
}
