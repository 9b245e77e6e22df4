//! Directory record decoding: short (main) entries, long-name sub-entries,
//! and the packed DOS date/time fields both carry.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{read_le_u16, read_le_u32};

/// A fully decoded directory entry: a main (short) entry with its
/// reassembled long name, if any preceded it.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub short_name: [u8; 8],
    pub short_ext: [u8; 3],
    pub long_name: String,
    pub attributes: u8,
    pub create_time: Option<NaiveDateTime>,
    pub last_access_date: Option<NaiveDate>,
    pub last_mod_time: Option<NaiveDateTime>,
    pub first_cluster: u32,
    pub file_size: u32,
}

impl DirEntry {
    pub fn is_directory(&self) -> bool {
        self.attributes & crate::ATTR_DIRECTORY != 0
    }

    /// The 8.3 short name with the implied dot and trailing space padding
    /// trimmed, e.g. `b"HELLO   "`/`b"TXT"` -> `"HELLO.TXT"`.
    pub fn short_name_string(&self) -> String {
        let name = trim_trailing_spaces(&self.short_name);
        let ext = trim_trailing_spaces(&self.short_ext);
        if ext.is_empty() {
            name
        } else {
            format!("{name}.{ext}")
        }
    }

    /// True for the "." and ".." pseudo-entries, compared against the
    /// decoded short name directly rather than a raw buffer byte.
    pub fn is_dot(&self) -> bool {
        self.short_name_string() == "."
    }

    pub fn is_dot_dot(&self) -> bool {
        self.short_name_string() == ".."
    }

    /// Decodes one 32-byte main directory record at fixed offsets, pairing
    /// it with `long_name` reassembled from any preceding LFN sub-entries.
    pub fn decode(record: &[u8; 32], long_name: String) -> Self {
        let mut short_name = [0u8; 8];
        short_name.copy_from_slice(&record[0..8]);
        let mut short_ext = [0u8; 3];
        short_ext.copy_from_slice(&record[8..11]);

        let attributes = record[11];

        let create_time_raw = read_le_u16(&record[14..16]);
        let create_date_raw = read_le_u16(&record[16..18]);
        let last_access_date_raw = read_le_u16(&record[18..20]);
        let cluster_hi = read_le_u16(&record[20..22]) as u32;
        let last_mod_time_raw = read_le_u16(&record[22..24]);
        let last_mod_date_raw = read_le_u16(&record[24..26]);
        let cluster_lo = read_le_u16(&record[26..28]) as u32;
        let file_size = read_le_u32(&record[28..32]);

        let first_cluster = (cluster_hi << 16) | cluster_lo;

        Self {
            short_name,
            short_ext,
            long_name,
            attributes,
            create_time: decode_datetime(create_date_raw, create_time_raw),
            last_access_date: decode_date(last_access_date_raw),
            last_mod_time: decode_datetime(last_mod_date_raw, last_mod_time_raw),
            first_cluster,
            file_size,
        }
    }
}

fn trim_trailing_spaces(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Decodes a packed DOS date: bits `[15:9]` year since 1980, `[8:5]` month,
/// `[4:0]` day. The calendar year is simply `1980 + year_field` — the
/// distilled source this is based on used a convoluted two-branch remap
/// that turned out to be a bug; there is no century rollover to emulate.
fn decode_date(raw: u16) -> Option<NaiveDate> {
    let year = 1980 + (raw >> 9) as i32;
    let month = ((raw >> 5) & 0x0F) as u32;
    let day = (raw & 0x1F) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Decodes a packed DOS time: bits `[15:11]` hours, `[10:5]` minutes,
/// `[4:0]` seconds/2.
fn decode_time(raw: u16) -> Option<NaiveTime> {
    let hours = (raw >> 11) as u32;
    let minutes = ((raw >> 5) & 0x3F) as u32;
    let seconds = ((raw & 0x1F) as u32) * 2;
    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

fn decode_datetime(date_raw: u16, time_raw: u16) -> Option<NaiveDateTime> {
    Some(NaiveDateTime::new(decode_date(date_raw)?, decode_time(time_raw)?))
}

/// Extracts the UCS-2 low bytes of one LFN sub-entry's 13 name-unit slots,
/// skipping the `0x00`/`0xFF` filler units used for null-termination and
/// padding. Per the Non-goals, only the low byte of each code unit is
/// kept — there is no attempt at proper UCS-2/UTF-16 decoding.
pub fn lfn_fragment(record: &[u8; 32]) -> String {
    let mut out = String::with_capacity(13);
    let ranges: [(usize, usize); 3] = [(1, 10), (14, 25), (28, 31)];
    for (start, end) in ranges {
        let mut i = start;
        while i <= end {
            let low = record[i];
            if low != 0x00 && low != 0xFF {
                out.push(low as char);
            }
            i += 2;
        }
    }
    out
}

/// The sequence number of an LFN sub-entry, masking off the
/// last-entry-in-set flag bit.
pub fn lfn_sequence(record: &[u8; 32]) -> u8 {
    record[0] & 0x1F
}

/// True when this sub-entry is the first in the name (it was written last
/// on disk, and carries the first characters of the name once reversed).
pub fn lfn_is_first(record: &[u8; 32]) -> bool {
    lfn_sequence(record) == 0x01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_year_as_1980_plus_field() {
        // year field 0 -> 1980, field 45 -> 2025, month 1 day 1.
        let raw0 = 0b0000000_0001_00001u16;
        assert_eq!(decode_date(raw0), NaiveDate::from_ymd_opt(1980, 1, 1));

        let raw45 = (45u16 << 9) | (1 << 5) | 1;
        assert_eq!(decode_date(raw45), NaiveDate::from_ymd_opt(2025, 1, 1));
    }

    #[test]
    fn decodes_time_fields() {
        // 13:05:30 -> hours=13, minutes=5, seconds_div_2=15
        let raw = (13u16 << 11) | (5 << 5) | 15;
        assert_eq!(decode_time(raw), NaiveTime::from_hms_opt(13, 5, 30));
    }

    #[test]
    fn lfn_fragment_skips_filler_bytes() {
        let mut record = [0xFFu8; 32];
        record[11] = 0x0F;
        // place "AB" low bytes at the first two name-unit slots (1,3)
        record[1] = b'A';
        record[2] = 0x00;
        record[3] = b'B';
        record[4] = 0x00;
        record[5] = 0x00; // null terminator, filtered
        record[6] = 0x00;
        let frag = lfn_fragment(&record);
        assert_eq!(frag, "AB");
    }

    #[test]
    fn short_name_formats_with_dot() {
        let record = DirEntry {
            short_name: *b"HELLO   ",
            short_ext: *b"TXT",
            long_name: String::new(),
            attributes: 0,
            create_time: None,
            last_access_date: None,
            last_mod_time: None,
            first_cluster: 2,
            file_size: 5,
        };
        assert_eq!(record.short_name_string(), "HELLO.TXT");
    }
}
