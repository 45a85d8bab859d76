//! Advertising payload construction.
//!
//! iOS only offers AMS to accessories that solicit it, so the payload
//! carries the 128-bit service UUID under AD type 0x15 next to the flags
//! and as much of the device name as still fits.

use heapless::Vec;

/// Legacy advertising PDU payload limit.
pub const MAX_ADV_LEN: usize = 31;

pub const AD_TYPE_FLAGS: u8 = 0x01;
pub const AD_TYPE_SHORTENED_NAME: u8 = 0x08;
pub const AD_TYPE_COMPLETE_NAME: u8 = 0x09;
pub const AD_TYPE_SOLICITED_UUID128: u8 = 0x15;

/// LE General Discoverable, BR/EDR not supported.
pub const FLAGS_GENERAL_DISCOVERABLE: u8 = 0x06;

pub type AdvPayload = Vec<u8, MAX_ADV_LEN>;

/// Build flags + solicited service + name.
///
/// `service_uuid` is in big-endian (string) order; it is reversed on the
/// wire. A name that does not fit is cut on a char boundary and marked
/// as shortened.
pub fn build_advertisement(service_uuid: &[u8; 16], name: &str) -> AdvPayload {
    let mut adv = AdvPayload::new();

    let _ = adv.extend_from_slice(&[2, AD_TYPE_FLAGS, FLAGS_GENERAL_DISCOVERABLE]);

    let _ = adv.extend_from_slice(&[17, AD_TYPE_SOLICITED_UUID128]);
    for &b in service_uuid.iter().rev() {
        let _ = adv.push(b);
    }

    // Length byte and AD type.
    let room = MAX_ADV_LEN - adv.len() - 2;
    if name.is_empty() || room == 0 {
        return adv;
    }

    let (name, ad_type) = if name.len() <= room {
        (name, AD_TYPE_COMPLETE_NAME)
    } else {
        let mut end = room;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        (&name[..end], AD_TYPE_SHORTENED_NAME)
    };

    let _ = adv.push(name.len() as u8 + 1);
    let _ = adv.push(ad_type);
    let _ = adv.extend_from_slice(name.as_bytes());
    adv
}

// The peripheral never scans; these readers check built payloads in tests.

/// Payload of the first AD structure of `ad_type`, if any.
///
/// Stops at a zero length byte or a structure that runs past the end.
#[cfg(test)]
pub fn find_ad_field(data: &[u8], ad_type: u8) -> Option<&[u8]> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        if data[i + 1] == ad_type {
            return Some(&data[i + 2..i + 1 + len]);
        }
        i += len + 1;
    }
    None
}

/// Whether the payload solicits the given 128-bit service.
#[cfg(test)]
pub fn solicits_service(data: &[u8], service_uuid: &[u8; 16]) -> bool {
    let Some(uuids) = find_ad_field(data, AD_TYPE_SOLICITED_UUID128) else {
        return false;
    };
    uuids.chunks_exact(16).any(|chunk| {
        chunk
            .iter()
            .zip(service_uuid.iter().rev())
            .all(|(a, b)| a == b)
    })
}

/// Complete or shortened local name. Invalid UTF-8 keeps the valid prefix.
#[cfg(test)]
pub fn local_name(data: &[u8]) -> Option<heapless::String<32>> {
    let bytes = find_ad_field(data, AD_TYPE_COMPLETE_NAME)
        .or_else(|| find_ad_field(data, AD_TYPE_SHORTENED_NAME))?;
    let mut name = heapless::String::new();
    for c in crate::ams::decoder::utf8_prefix(bytes).chars() {
        if name.push(c).is_err() {
            break;
        }
    }
    Some(name)
}
