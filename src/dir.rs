//! Directory-record walking: LFN reassembly and end-of-directory/deleted-entry
//! handling over a buffer of 32-byte records.

use crate::entry::{lfn_fragment, DirEntry};
use crate::{ATTR_LONG_NAME, DIRENT_SIZE, DIR_ENTRY_DELETED, DIR_ENTRY_END};

/// Reassembles a long file name from LFN sub-entries encountered in
/// reverse on-disk order. Sub-entries are pushed to the front of an
/// internal stack as they're seen, so popping front-to-back yields the
/// name in natural order once the sequence-0x01 entry (written last on
/// disk) arrives.
///
/// Scoped to a single `read_directory` call: state never survives past
/// one main entry, one terminator, or the end of the walk, so nothing
/// leaks between unrelated directory reads.
#[derive(Default)]
struct LfnAssembler {
    fragments: Vec<String>,
}

impl LfnAssembler {
    fn push(&mut self, record: &[u8; 32]) {
        self.fragments.insert(0, lfn_fragment(record));
    }

    fn take(&mut self) -> String {
        let name: String = self.fragments.concat();
        self.fragments.clear();
        name
    }

    fn reset(&mut self) {
        self.fragments.clear();
    }
}

/// Walks `buffer` as a sequence of 32-byte directory records and decodes
/// them into an owned list, following the rules in order:
///
/// - byte[0] == 0x00 stops the walk immediately, even if more records
///   remain in the buffer.
/// - byte[0] == 0xE5 (deleted) is skipped.
/// - byte[11] == 0x0F is an LFN sub-entry, folded into the assembler.
/// - anything else is a main entry: any pending LFN name is flushed into
///   it before it's decoded and appended to the output.
pub fn walk_directory_buffer(buffer: &[u8]) -> Vec<DirEntry> {
    let mut out = Vec::new();
    let mut lfn = LfnAssembler::default();

    for chunk in buffer.chunks_exact(DIRENT_SIZE) {
        let record: &[u8; 32] = chunk.try_into().expect("chunks_exact(32)");

        if record[0] == DIR_ENTRY_END {
            break;
        }
        if record[0] == DIR_ENTRY_DELETED {
            lfn.reset();
            continue;
        }
        if record[11] == ATTR_LONG_NAME {
            lfn.push(record);
            continue;
        }

        let long_name = lfn.take();
        out.push(DirEntry::decode(record, long_name));
    }

    out
}
