//! Interactive listing/navigation/dump loop driven entirely through
//! [`Volume`]'s public operations.

use std::io::{self, Write};

use chrono::NaiveDateTime;
use log::error;

use crate::block_device::BlockDevice;
use crate::entry::DirEntry;
use crate::error::InvalidInput;
use crate::volume::Volume;

fn format_row(index: usize, entry: &DirEntry) -> String {
    let kind = if entry.is_directory() { "Folder" } else { "File" };
    let stamp = entry
        .last_mod_time
        .as_ref()
        .map(format_datetime)
        .unwrap_or_else(|| "--/--/---- --:--".to_string());

    let mut row = format!(
        "{:>3}  {:<12} {}  {:<6} {:>10}",
        index,
        entry.short_name_string(),
        stamp,
        kind,
        entry.file_size,
    );
    if !entry.long_name.is_empty() {
        row.push_str("  ");
        row.push_str(&entry.long_name);
    }
    row
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%m/%d/%Y %H:%M").to_string()
}

fn print_listing(entries: &[DirEntry]) {
    println!(
        "{:>3}  {:<12} {:<16}  {:<6} {:>10}",
        "#", "Name", "Modified", "Type", "Size"
    );
    for (i, entry) in entries.iter().enumerate() {
        println!("{}", format_row(i + 1, entry));
    }
    println!("{:>3}  Exit", entries.len() + 1);
}

/// Reads one line from stdin and parses it as a 1-based selection in
/// `[1, entry_count + 1]`. Returns the recoverable [`InvalidInput`]
/// variant on parse failure or out-of-range input, per the "Invalid
/// syntax, re-prompt" contract.
fn read_selection(entry_count: usize) -> Result<usize, InvalidInput> {
    print!("> ");
    io::stdout().flush().ok();

    let mut line = String::new();
    if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
        return Err(InvalidInput::NotANumber);
    }

    parse_selection(&line, entry_count)
}

fn parse_selection(line: &str, entry_count: usize) -> Result<usize, InvalidInput> {
    let choice: usize = line.trim().parse().map_err(|_| InvalidInput::NotANumber)?;
    if choice < 1 || choice > entry_count + 1 {
        return Err(InvalidInput::OutOfRange);
    }
    Ok(choice)
}

/// Streams a file's bytes to `out`, one cluster at a time, truncated to
/// `file_size` total bytes even when the final cluster extends past it.
fn dump_file<D: BlockDevice, W: Write>(
    volume: &mut Volume<D>,
    first_cluster: u32,
    file_size: u32,
    out: &mut W,
) {
    let mut remaining = file_size as usize;
    let mut cluster = first_cluster;
    let cluster_bytes = volume.info().cluster_byte_size() as usize;
    let mut buf = vec![0u8; cluster_bytes];

    loop {
        let has_more = volume.read_data(&mut cluster, &mut buf);
        let take = remaining.min(cluster_bytes);
        if out.write_all(&buf[..take]).is_err() {
            break;
        }
        remaining -= take;
        if remaining == 0 || !has_more {
            break;
        }
    }
}

/// Runs the list/select/act loop starting at the root directory until the
/// user selects the exit option.
pub fn run<D: BlockDevice>(volume: &mut Volume<D>) {
    let mut stack: Vec<u32> = Vec::new();
    let mut current: u32 = 0;

    loop {
        let entries = volume.read_directory(current);
        print_listing(&entries);

        let choice = match read_selection(entries.len()) {
            Ok(c) => c,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if choice == entries.len() + 1 {
            break;
        }

        let entry = &entries[choice - 1];
        if entry.is_directory() {
            if entry.is_dot() {
                continue;
            }
            if entry.is_dot_dot() {
                current = stack.pop().unwrap_or(0);
                continue;
            }
            stack.push(current);
            current = entry.first_cluster;
        } else if entry.file_size != 0 {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            dump_file(volume, entry.first_cluster, entry.file_size, &mut handle);
        }
    }
}

pub fn report_mount_failure(err: &dyn std::error::Error) {
    error!("failed to mount volume: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_device::MemoryBlockDevice;

    fn pack_bpb_into(sector: &mut [u8; 512], fields: &[(usize, &[u8])]) {
        for (offset, bytes) in fields {
            sector[*offset..*offset + bytes.len()].copy_from_slice(bytes);
        }
    }

    fn encode_fat12_pair(a: u16, b: u16) -> [u8; 3] {
        [
            (a & 0xFF) as u8,
            ((a >> 8) as u8) | (((b & 0x0F) as u8) << 4),
            (b >> 4) as u8,
        ]
    }

    #[test]
    fn dump_file_truncates_exactly_at_file_size_across_two_clusters() {
        // Same FAT12 geometry as volume.rs's two-cluster test, but the file
        // size (515) doesn't land on the 512-byte cluster boundary.
        let mut image = vec![0u8; 32 * 512];
        let mut boot = [0u8; 512];
        pack_bpb_into(
            &mut boot,
            &[
                (11, &512u16.to_le_bytes()),
                (13, &[1u8]),
                (14, &1u16.to_le_bytes()),
                (16, &[2u8]),
                (17, &16u16.to_le_bytes()),
                (19, &32u16.to_le_bytes()),
                (22, &1u16.to_le_bytes()),
            ],
        );
        image[0..512].copy_from_slice(&boot);

        // FAT1 at sector 1: clusters 0,1 = 0; cluster2 -> 3; cluster3 -> EOF.
        let fat_off = 512;
        image[fat_off..fat_off + 3].copy_from_slice(&encode_fat12_pair(0, 0));
        image[fat_off + 3..fat_off + 6].copy_from_slice(&encode_fat12_pair(3, 0x0FFF));

        let file_size: u32 = 512 + 3;
        let mut entry = [0u8; 32];
        entry[0..8].copy_from_slice(b"HELLO   ");
        entry[8..11].copy_from_slice(b"TXT");
        entry[26..28].copy_from_slice(&2u16.to_le_bytes());
        entry[28..32].copy_from_slice(&file_size.to_le_bytes());
        let root_off = 3 * 512;
        image[root_off..root_off + 32].copy_from_slice(&entry);

        // data cluster 2 at sector 4: filled with 'A'.
        image[4 * 512..5 * 512].copy_from_slice(&[b'A'; 512]);
        // data cluster 3 at sector 5: only the first 3 bytes belong to the
        // file; the rest of the cluster is padding that must not appear
        // in the captured output.
        image[5 * 512] = b'B';
        image[5 * 512 + 1] = b'B';
        image[5 * 512 + 2] = b'B';
        image[5 * 512 + 3..6 * 512].copy_from_slice(&[b'Z'; 512 - 3]);

        let device = MemoryBlockDevice::new(image);
        let mut volume = Volume::mount(device).unwrap();
        let entries = volume.read_directory(0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_size, file_size);

        let mut captured = Vec::new();
        dump_file(
            &mut volume,
            entries[0].first_cluster,
            entries[0].file_size,
            &mut captured,
        );

        assert_eq!(captured.len(), file_size as usize);
        assert_eq!(&captured[..512], &[b'A'; 512][..]);
        assert_eq!(&captured[512..515], b"BBB");
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert!(matches!(
            parse_selection("abc", 3),
            Err(InvalidInput::NotANumber)
        ));
    }

    #[test]
    fn rejects_zero_and_out_of_range() {
        assert!(matches!(parse_selection("0", 3), Err(InvalidInput::OutOfRange)));
        assert!(matches!(parse_selection("99", 3), Err(InvalidInput::OutOfRange)));
    }

    #[test]
    fn accepts_exit_option_one_past_last_entry() {
        assert_eq!(parse_selection("4", 3).unwrap(), 4);
    }
}
