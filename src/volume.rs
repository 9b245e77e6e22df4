//! Ties a [`BlockDevice`], decoded [`VolumeInfo`], and [`FatTable`] into one
//! owned value with the mount/read-directory/read-data operations the
//! browser drives. No process-wide state: everything lives on this struct
//! and is passed around by reference.

use log::{info, warn};

use crate::bpb::{BiosParameterBlock, FatVariant, VolumeInfo};
use crate::block_device::{BlockDevice, DEFAULT_SECTOR_SIZE};
use crate::dir::walk_directory_buffer;
use crate::entry::DirEntry;
use crate::error::{ImageOpenError, MountError};
use crate::fat::FatTable;

pub struct Volume<D: BlockDevice> {
    device: D,
    info: VolumeInfo,
    fat: FatTable,
}

impl<D: BlockDevice> Volume<D> {
    /// Reads the boot sector, classifies the FAT variant, and decodes the
    /// entire FAT table in one bulk read. Only the first FAT copy is used.
    pub fn mount(mut device: D) -> Result<Self, MountError> {
        let mut boot_sector = [0u8; DEFAULT_SECTOR_SIZE];
        let n = device.read_sector(0, &mut boot_sector);
        if n < DEFAULT_SECTOR_SIZE {
            return Err(MountError::Open(ImageOpenError::ShortBootSectorRead {
                bytes_read: n,
            }));
        }

        let bpb = BiosParameterBlock::parse(&boot_sector);
        if bpb.bytes_per_sector == 0 {
            return Err(MountError::ZeroBytesPerSector);
        }
        if bpb.sectors_per_cluster == 0 {
            return Err(MountError::ZeroSectorsPerCluster);
        }

        let info = VolumeInfo::classify(&bpb).ok_or(MountError::ZeroBytesPerSector)?;
        info!("mounted volume as {:?}", info.variant);

        device.set_sector_size(info.bytes_per_sector as usize);

        let fat_bytes = info.sectors_per_fat as usize * info.bytes_per_sector as usize;
        let mut fat_raw = vec![0u8; fat_bytes];
        let read = device.read_sectors(
            info.first_fat_sector as u64,
            info.sectors_per_fat as u64,
            &mut fat_raw,
        );
        if read < fat_bytes {
            return Err(MountError::ShortFatRead {
                bytes_read: read,
                expected: fat_bytes,
            });
        }

        let fat = FatTable::decode(&fat_raw, info.variant);

        Ok(Self { device, info, fat })
    }

    pub fn info(&self) -> &VolumeInfo {
        &self.info
    }

    /// Reads a directory. `location == 0` means the root directory: on
    /// FAT12/16 that's the fixed root region, on FAT32 it's the cluster
    /// chain starting at `fat32_root_cluster`. Any other `location` is a
    /// subdirectory's first cluster.
    pub fn read_directory(&mut self, location: u32) -> Vec<DirEntry> {
        if location == 0 && self.info.variant != FatVariant::Fat32 {
            return self.read_fixed_root();
        }

        let start_cluster = if location == 0 {
            self.info.fat32_root_cluster
        } else {
            location
        };
        self.read_cluster_chain_as_directory(start_cluster)
    }

    fn read_fixed_root(&mut self) -> Vec<DirEntry> {
        let bytes = self.info.root_sector_count as usize * self.info.bytes_per_sector as usize;
        let mut buf = vec![0u8; bytes];
        let n = self.device.read_sectors(
            self.info.root_first_sector as u64,
            self.info.root_sector_count as u64,
            &mut buf,
        );
        if n == 0 {
            warn!("short read of fixed root directory region");
            return Vec::new();
        }
        walk_directory_buffer(&buf[..n])
    }

    fn read_cluster_chain_as_directory(&mut self, start_cluster: u32) -> Vec<DirEntry> {
        let mut out = Vec::new();
        let mut cluster = start_cluster;
        let cluster_bytes = self.info.cluster_byte_size() as usize;
        let mut buf = vec![0u8; cluster_bytes];

        loop {
            let sector = self.info.data_sector_of_cluster(cluster) as u64;
            let n = self
                .device
                .read_sectors(sector, self.info.sectors_per_cluster as u64, &mut buf);
            if n == 0 {
                warn!("short read of directory cluster {cluster}");
                break;
            }
            out.extend(walk_directory_buffer(&buf[..n]));

            match self.fat.get(cluster) {
                Some(next) if next != self.info.eof_marker() => cluster = next,
                _ => break,
            }
        }

        out
    }

    /// Reads one full cluster into `out_buf` (which must be at least
    /// `cluster_byte_size()` bytes), advances `*cluster` to its FAT
    /// successor, and reports whether the chain continues.
    pub fn read_data(&mut self, cluster: &mut u32, out_buf: &mut [u8]) -> bool {
        let sector = self.info.data_sector_of_cluster(*cluster) as u64;
        let n = self
            .device
            .read_sectors(sector, self.info.sectors_per_cluster as u64, out_buf);
        if n == 0 {
            return false;
        }

        match self.fat.get(*cluster) {
            Some(next) if next != self.info.eof_marker() => {
                *cluster = next;
                true
            }
            _ => false,
        }
    }
}
