//! SD card block storage over `embedded-sdmmc`
//!
//! SD card operations are blocking; the core only awaits sensors and the
//! clock. Every operation opens the volume, walks to the target, and
//! closes everything again before returning, so no handle survives a call
//! and a power loss between cycles never catches an open file. Error
//! paths lean on the RAII wrappers to close whatever was already open.

use embedded_sdmmc::{
    Error as SdError, Mode, SdCard, SdCardError, TimeSource, Timestamp, VolumeIdx, VolumeManager,
};

use luxlog_core::storage::{BlockStorage, StorageError};

/// FAT directory entries get this fixed stamp; the real acquisition time
/// is inside every record line, so the filesystem clock does not matter.
pub struct FixedTimeSource;

impl TimeSource for FixedTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 54,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

pub struct SdCardStorage<S, D>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
{
    volume_mgr: VolumeManager<SdCard<S, D>, FixedTimeSource, 4, 4, 1>,
    mount_point: &'static str,
}

impl<S, D> SdCardStorage<S, D>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
{
    pub fn new(sd_card: SdCard<S, D>, mount_point: &'static str) -> Self {
        Self {
            volume_mgr: VolumeManager::new(sd_card, FixedTimeSource),
            mount_point,
        }
    }

    /// Strips `<mount>/` off a core-built path, leaving the on-card
    /// relative part.
    fn relative<'p>(&self, path: &'p str) -> Result<&'p str, StorageError> {
        path.strip_prefix(self.mount_point)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or(StorageError::Io {
                details: "path is outside the mount point",
            })
    }
}

fn io(details: &'static str) -> impl Fn(SdError<SdCardError>) -> StorageError {
    move |_| StorageError::Io { details }
}

impl<S, D> BlockStorage for SdCardStorage<S, D>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
{
    /// Probes the card by opening and closing the first volume. This
    /// stands in for the raw-disk access check done at bring-up: a missing
    /// or unreadable card fails here, before any sample is dropped on the
    /// write path.
    fn mount(&mut self, mount_point: &str) -> Result<(), StorageError> {
        if mount_point != self.mount_point {
            return Err(StorageError::Io {
                details: "unknown mount point",
            });
        }
        let volume = self
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(io("no usable volume on card"))?;
        volume.close().map_err(io("volume close failed"))?;
        Ok(())
    }

    /// Nothing to release: every operation already closed its handles, so
    /// the card is never left in a mounted state between cycles.
    fn unmount(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn create_dir(&mut self, dir_path: &str) -> Result<(), StorageError> {
        let name = self.relative(dir_path)?;

        let volume = self
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(io("volume open failed"))?;
        let root = volume.open_root_dir().map_err(io("root dir open failed"))?;

        match root.make_dir_in_dir(name) {
            Ok(()) => {}
            Err(SdError::DirAlreadyExists) => return Err(StorageError::AlreadyExists),
            Err(_) => {
                return Err(StorageError::Io {
                    details: "directory creation failed",
                });
            }
        }

        root.close().map_err(io("dir close failed"))?;
        volume.close().map_err(io("volume close failed"))?;
        Ok(())
    }

    fn create_file(&mut self, file_path: &str) -> Result<(), StorageError> {
        let rel = self.relative(file_path)?;
        let (dir_name, file_name) = rel.split_once('/').ok_or(StorageError::Io {
            details: "file path has no directory component",
        })?;

        let volume = self
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(io("volume open failed"))?;
        let root = volume.open_root_dir().map_err(io("root dir open failed"))?;
        let dir = root.open_dir(dir_name).map_err(io("log dir open failed"))?;

        // Create-only mode: an existing log file is reported as such and
        // must never be truncated.
        let file = match dir.open_file_in_dir(file_name, Mode::ReadWriteCreate) {
            Ok(file) => file,
            Err(SdError::FileAlreadyExists) => return Err(StorageError::AlreadyExists),
            Err(_) => {
                return Err(StorageError::Io {
                    details: "file creation failed",
                });
            }
        };

        file.close().map_err(io("file close failed"))?;
        dir.close().map_err(io("dir close failed"))?;
        root.close().map_err(io("root close failed"))?;
        volume.close().map_err(io("volume close failed"))?;
        Ok(())
    }

    fn append(&mut self, file_path: &str, data: &[u8]) -> Result<(), StorageError> {
        let rel = self.relative(file_path)?;
        let (dir_name, file_name) = rel.split_once('/').ok_or(StorageError::Io {
            details: "file path has no directory component",
        })?;

        let volume = self
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(io("volume open failed"))?;
        let root = volume.open_root_dir().map_err(io("root dir open failed"))?;
        let dir = root.open_dir(dir_name).map_err(io("log dir open failed"))?;

        let file = dir
            .open_file_in_dir(file_name, Mode::ReadWriteAppend)
            .map_err(|_| StorageError::OpenFailed)?;

        file.write(data).map_err(io("write failed"))?;

        file.close().map_err(io("file close failed"))?;
        dir.close().map_err(io("dir close failed"))?;
        root.close().map_err(io("root close failed"))?;
        volume.close().map_err(io("volume close failed"))?;
        Ok(())
    }
}
