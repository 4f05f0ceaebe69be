use heapless::{String, Vec};

use crate::error::BleError;

/// Legacy advertising payload limit.
pub const ADV_MAX_LEN: usize = 31;

const AD_FLAGS: u8 = 0x01;
const AD_SHORT_NAME: u8 = 0x08;
const AD_COMPLETE_NAME: u8 = 0x09;

/// LE General Discoverable, BR/EDR not supported.
const FLAGS_GENERAL_DISCOVERABLE: u8 = 0x06;

/// Build the advertising payload for the companion app: flags followed by
/// the device name.
///
/// Names that do not fit are cut at a character boundary and advertised
/// as a shortened local name.
pub fn build_advertisement(name: &str) -> Result<Vec<u8, ADV_MAX_LEN>, BleError> {
    let mut data: Vec<u8, ADV_MAX_LEN> = Vec::new();
    data.extend_from_slice(&[0x02, AD_FLAGS, FLAGS_GENERAL_DISCOVERABLE])
        .map_err(|_| BleError::AdvertisementTooLong)?;

    // length byte + type byte
    let room = ADV_MAX_LEN - data.len() - 2;
    let mut end = name.len().min(room);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    if end == 0 {
        return Err(BleError::AdvertisementTooLong);
    }
    let ad_type = if end < name.len() {
        AD_SHORT_NAME
    } else {
        AD_COMPLETE_NAME
    };

    data.extend_from_slice(&[end as u8 + 1, ad_type])
        .map_err(|_| BleError::AdvertisementTooLong)?;
    data.extend_from_slice(&name.as_bytes()[..end])
        .map_err(|_| BleError::AdvertisementTooLong)?;
    Ok(data)
}

/// Extract complete/shortened local name from advertisement data.
pub fn extract_device_name(data: &[u8]) -> Option<String<32>> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        let ad_type = data[i + 1];
        if ad_type == AD_SHORT_NAME || ad_type == AD_COMPLETE_NAME {
            let name_bytes = &data[i + 2..i + 1 + len];
            let text = core::str::from_utf8(name_bytes).ok()?;
            return Some(crate::link::truncated(text));
        }
        i += len + 1;
    }
    None
}

/// Whether the payload carries the general-discoverable flag.
pub fn is_discoverable(data: &[u8]) -> bool {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        if data[i + 1] == AD_FLAGS && len >= 2 {
            return data[i + 2] & 0x02 != 0;
        }
        i += len + 1;
    }
    false
}
