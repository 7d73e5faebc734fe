use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::CaptureError;
use crate::processing::wav;

/// Streaming WAV file writer.
///
/// Opens the file with a placeholder 44-byte header, appends raw PCM as
/// buffers arrive, and patches the header sizes (and the actual sample
/// rate, once known) on close. Protect with a `Mutex` for cross-thread
/// access from the capture callback.
pub struct WavFileWriter {
    file_path: PathBuf,
    file: Option<File>,
    total_bytes_written: u64,
    is_open: bool,
}

impl WavFileWriter {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            file: None,
            total_bytes_written: 0,
            is_open: false,
        }
    }

    /// Create the file and write the initial 44-byte WAV header.
    pub fn open(&mut self, sample_rate: u32, bit_depth: u16, channels: u16) -> Result<(), CaptureError> {
        if self.is_open {
            return Ok(());
        }

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;
        }

        let file = File::create(&self.file_path)
            .map_err(|e| CaptureError::StorageError(format!("failed to create file: {}", e)))?;

        self.file = Some(file);

        // Data size is a placeholder, patched on close.
        let header = wav::generate_wav_header(sample_rate, bit_depth, channels, 0);
        self.write_raw(&header)?;
        self.is_open = true;
        Ok(())
    }

    /// Append raw PCM bytes.
    pub fn write(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        if !self.is_open {
            return Err(CaptureError::StorageError("file is not open for writing".into()));
        }
        self.write_raw(data)
    }

    /// Finalize the file: patch the WAV header sizes, flush, and compute
    /// the SHA-256 checksum of the completed file.
    ///
    /// `actual_sample_rate` patches the rate fields when the input's
    /// detected rate differs from the nominal rate written at open.
    pub fn close(
        &mut self,
        actual_sample_rate: Option<f64>,
        channels: u16,
        bit_depth: u16,
    ) -> Result<String, CaptureError> {
        if !self.is_open {
            return Err(CaptureError::StorageError("file is not open".into()));
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CaptureError::StorageError("file is not open".into()))?;
        let data_size = self.total_bytes_written - wav::WAV_HEADER_SIZE as u64;

        // Patch RIFF chunk size at offset 4
        file.seek(SeekFrom::Start(4))
            .map_err(|e| CaptureError::StorageError(e.to_string()))?;
        let file_size = (self.total_bytes_written - 8) as u32;
        file.write_all(&file_size.to_le_bytes())
            .map_err(|e| CaptureError::StorageError(e.to_string()))?;

        // Patch the rate fields with the rate the hardware actually delivered
        if let Some(rate) = actual_sample_rate {
            let sample_rate = rate as u32;
            let byte_rate = sample_rate * channels as u32 * bit_depth as u32 / 8;
            let block_align = channels * bit_depth / 8;

            file.seek(SeekFrom::Start(24))
                .map_err(|e| CaptureError::StorageError(e.to_string()))?;
            file.write_all(&sample_rate.to_le_bytes())
                .map_err(|e| CaptureError::StorageError(e.to_string()))?;
            file.write_all(&byte_rate.to_le_bytes())
                .map_err(|e| CaptureError::StorageError(e.to_string()))?;
            file.write_all(&block_align.to_le_bytes())
                .map_err(|e| CaptureError::StorageError(e.to_string()))?;
        }

        // Patch data size at offset 40
        file.seek(SeekFrom::Start(40))
            .map_err(|e| CaptureError::StorageError(e.to_string()))?;
        let data_size_u32 = data_size as u32;
        file.write_all(&data_size_u32.to_le_bytes())
            .map_err(|e| CaptureError::StorageError(e.to_string()))?;

        file.flush().map_err(|e| CaptureError::StorageError(e.to_string()))?;
        self.file = None;
        self.is_open = false;

        let checksum = sha256_file(&self.file_path)?;
        Ok(checksum)
    }

    /// Abandon the recording: close the handle and remove the file from
    /// disk. Used on failed starts and discarded (too-short) recordings so
    /// no orphan files are left behind.
    pub fn discard(&mut self) -> Result<(), CaptureError> {
        self.file = None;
        self.is_open = false;
        if self.file_path.exists() {
            fs::remove_file(&self.file_path)
                .map_err(|e| CaptureError::StorageError(format!("failed to remove file: {}", e)))?;
        }
        Ok(())
    }

    /// Total bytes written so far (including the WAV header).
    pub fn bytes_written(&self) -> u64 {
        self.total_bytes_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CaptureError::StorageError("file is not open".into()))?;
        file.write_all(data)
            .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;
        self.total_bytes_written += data.len() as u64;
        Ok(())
    }
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, CaptureError> {
    let data =
        fs::read(path).map_err(|e| CaptureError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ambient_capture_writer_{}", name))
    }

    #[test]
    fn write_plain_wav() {
        let path = temp_file_path("plain.wav");

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(48000, 16, 1).unwrap();

        // Write some PCM data (8 mono frames = 16 bytes)
        let pcm = vec![0u8; 16];
        writer.write(&pcm).unwrap();

        let checksum = writer.close(None, 1, 16).unwrap();
        assert_eq!(checksum.len(), 64); // SHA-256 hex

        let file_data = fs::read(&path).unwrap();
        assert_eq!(file_data.len(), 44 + 16); // header + data

        assert_eq!(&file_data[0..4], b"RIFF");
        assert_eq!(&file_data[8..12], b"WAVE");

        let data_size = u32::from_le_bytes([file_data[40], file_data[41], file_data[42], file_data[43]]);
        assert_eq!(data_size, 16);

        let chunk_size = u32::from_le_bytes([file_data[4], file_data[5], file_data[6], file_data[7]]);
        assert_eq!(chunk_size, 36 + 16);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn close_patches_detected_rate() {
        let path = temp_file_path("rate.wav");

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(48000, 16, 1).unwrap();
        writer.write(&vec![0u8; 16]).unwrap();
        writer.close(Some(44100.0), 1, 16).unwrap();

        let file_data = fs::read(&path).unwrap();
        let sample_rate = u32::from_le_bytes([file_data[24], file_data[25], file_data[26], file_data[27]]);
        assert_eq!(sample_rate, 44100);

        let byte_rate = u32::from_le_bytes([file_data[28], file_data[29], file_data[30], file_data[31]]);
        assert_eq!(byte_rate, 88200); // 44100 * 1 * 2

        fs::remove_file(&path).ok();
    }

    #[test]
    fn write_after_close_fails() {
        let path = temp_file_path("closed.wav");

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(48000, 16, 1).unwrap();
        writer.close(None, 1, 16).unwrap();

        assert!(writer.write(&[0u8; 4]).is_err());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn discard_removes_file() {
        let path = temp_file_path("discard.wav");

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(48000, 16, 1).unwrap();
        writer.write(&vec![0u8; 32]).unwrap();
        writer.discard().unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn discard_without_open_is_harmless() {
        let path = temp_file_path("never_opened.wav");
        let mut writer = WavFileWriter::new(path);
        assert!(writer.discard().is_ok());
    }

    #[test]
    fn bytes_written_includes_header() {
        let path = temp_file_path("bytes.wav");

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(48000, 16, 1).unwrap();
        assert_eq!(writer.bytes_written(), 44);

        writer.write(&vec![0u8; 10]).unwrap();
        assert_eq!(writer.bytes_written(), 54);

        writer.close(None, 1, 16).unwrap();
        fs::remove_file(&path).ok();
    }
}
