//! Single-pass extraction of a gzip-compressed tar stream.

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use flate2::read::GzDecoder;
use tracing::debug;
use tracing::warn;

use super::common::create_directory;
use super::common::write_file;
use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::FetchError;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::io::CountingReader;
use crate::security::resolve_member;
use crate::types::ArchiveMember;
use crate::types::DestDir;
use crate::types::MemberKind;

/// Decompresses and unpacks a tar.gz byte stream below a destination root.
///
/// The stream is consumed exactly once and never buffered whole. Each
/// member name is validated before anything is written for it; the first
/// unsafe name aborts the pass, leaving members already written in place.
///
/// # Examples
///
/// ```no_run
/// use datafetch_core::ExtractConfig;
/// use datafetch_core::NoopProgress;
/// use datafetch_core::extraction::ArchiveStreamExtractor;
/// use datafetch_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = std::fs::File::open("dataset.tgz")?;
/// let dest = DestDir::new("/data/testdata")?;
/// let extractor = ArchiveStreamExtractor::new(ExtractConfig::default());
/// let report = extractor.extract(file, &dest, &mut NoopProgress)?;
/// println!("{} members extracted", report.extracted_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveStreamExtractor {
    config: ExtractConfig,
}

impl ArchiveStreamExtractor {
    /// Creates an extractor with the given configuration.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Returns the extraction configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts every member of the tar.gz stream `reader` below `dest`.
    ///
    /// # Errors
    ///
    /// - `UnsafeArchiveMember` naming the first member that resolves
    ///   outside `dest`
    /// - `CorruptArchive` if the stream is not valid gzip or tar, is
    ///   truncated, or stops yielding data
    /// - `WriteFailure` if the filesystem refuses a write
    pub fn extract<R: Read>(
        &self,
        reader: R,
        dest: &DestDir,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();
        let mut report = ExtractionReport::new();

        let mut archive = tar::Archive::new(GzDecoder::new(CountingReader::new(reader)));
        self.extract_entries(&mut archive, dest, &mut report, progress)?;

        // Read past the end-of-archive blocks so the gzip trailer is checked.
        let mut decoder = archive.into_inner();
        std::io::copy(&mut decoder, &mut std::io::sink()).map_err(FetchError::corrupt)?;
        report.bytes_downloaded = decoder.into_inner().total_bytes();
        report.duration = start.elapsed();
        progress.on_complete();

        debug!(
            files = report.files_extracted,
            directories = report.directories_created,
            skipped = report.members_skipped,
            bytes = report.bytes_written,
            "extraction finished"
        );

        Ok(report)
    }

    fn extract_entries<R: Read>(
        &self,
        archive: &mut tar::Archive<R>,
        dest: &DestDir,
        report: &mut ExtractionReport,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        let mut buffer = CopyBuffer::new();
        let entries = archive.entries().map_err(FetchError::corrupt)?;

        for (index, entry) in entries.enumerate() {
            let mut entry = entry.map_err(FetchError::corrupt)?;
            let member = ArchiveMember::from_entry(&entry);

            let Some(relative) = resolve_member(dest.as_path(), &member.name) else {
                warn!(member = %member.name, "archive member escapes destination");
                return Err(FetchError::UnsafeArchiveMember {
                    member_name: member.name,
                });
            };

            debug!(
                member = %member.name,
                kind = member.kind.label(),
                size = member.size,
                "extracting member"
            );

            match member.kind {
                MemberKind::Directory if is_root(&relative) => continue,
                MemberKind::Directory => {
                    progress.on_entry_start(&relative, index + 1);
                    create_directory(&member, &relative, dest, report)?;
                }
                MemberKind::File if is_root(&relative) => {
                    return Err(FetchError::UnsafeArchiveMember {
                        member_name: member.name,
                    });
                }
                MemberKind::File => {
                    progress.on_entry_start(&relative, index + 1);
                    write_file(
                        &mut entry,
                        &member,
                        &relative,
                        dest,
                        &self.config,
                        &mut buffer,
                        report,
                        progress,
                    )?;
                }
                MemberKind::Other => {
                    warn!(member = %member.name, "skipping non-regular archive member");
                    report.members_skipped += 1;
                    report.add_warning(format!("skipped non-regular member: {}", member.name));
                    continue;
                }
            }

            progress.on_entry_complete(&relative);
        }

        Ok(())
    }
}

fn is_root(relative: &Path) -> bool {
    relative.as_os_str().is_empty()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::test_utils::TarGzBuilder;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        started: Vec<PathBuf>,
        completed: usize,
        bytes: u64,
        finished: bool,
    }

    impl ProgressCallback for Recorder {
        fn on_download_start(&mut self, _url: &str, _content_length: Option<u64>) {}

        fn on_entry_start(&mut self, path: &Path, _current: usize) {
            self.started.push(path.to_path_buf());
        }

        fn on_bytes_written(&mut self, bytes: u64) {
            self.bytes += bytes;
        }

        fn on_entry_complete(&mut self, _path: &Path) {
            self.completed += 1;
        }

        fn on_complete(&mut self) {
            self.finished = true;
        }
    }

    fn extract(data: Vec<u8>, temp: &TempDir) -> Result<ExtractionReport> {
        let dest = DestDir::new(temp.path()).unwrap();
        ArchiveStreamExtractor::default().extract(Cursor::new(data), &dest, &mut NoopProgress)
    }

    #[test]
    fn test_extracts_files_and_directories() {
        let data = TarGzBuilder::new()
            .add_directory("data_fusion/")
            .add_file("data_fusion/a.txt", b"alpha")
            .add_file("data_fusion/sub/b.txt", b"beta")
            .build();
        let temp = TempDir::new().unwrap();

        let report = extract(data.clone(), &temp).unwrap();

        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.directories_created, 1);
        assert_eq!(report.bytes_written, 9);
        assert_eq!(report.bytes_downloaded, data.len() as u64);
        assert_eq!(
            std::fs::read(temp.path().join("data_fusion/sub/b.txt")).unwrap(),
            b"beta"
        );
    }

    #[test]
    fn test_traversal_aborts_extraction() {
        let data = TarGzBuilder::new()
            .add_file("ok.txt", b"fine")
            .add_raw_name_file("../evil.txt", b"pwned")
            .add_file("never.txt", b"unreached")
            .build();
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("root");
        std::fs::create_dir(&root).unwrap();
        let dest = DestDir::new(&root).unwrap();

        let err = ArchiveStreamExtractor::default()
            .extract(Cursor::new(data), &dest, &mut NoopProgress)
            .unwrap_err();

        match err {
            FetchError::UnsafeArchiveMember { member_name } => {
                assert_eq!(member_name, "../evil.txt");
            }
            other => panic!("expected UnsafeArchiveMember, got {other:?}"),
        }
        assert!(root.join("ok.txt").exists());
        assert!(!parent.path().join("evil.txt").exists());
        assert!(!root.join("never.txt").exists());
    }

    #[test]
    fn test_absolute_member_rejected() {
        let data = TarGzBuilder::new()
            .add_raw_name_file("/etc/passwd", b"root:x:0:0")
            .build();
        let temp = TempDir::new().unwrap();

        let result = extract(data, &temp);
        assert!(matches!(
            result,
            Err(FetchError::UnsafeArchiveMember { .. })
        ));
    }

    #[test]
    fn test_dotdot_inside_root_allowed() {
        let data = TarGzBuilder::new()
            .add_raw_name_file("sub/../inside.txt", b"ok")
            .build();
        let temp = TempDir::new().unwrap();

        let report = extract(data, &temp).unwrap();
        assert_eq!(report.files_extracted, 1);
        assert!(temp.path().join("inside.txt").is_file());
    }

    #[test]
    fn test_symlink_member_skipped() {
        let data = TarGzBuilder::new()
            .add_file("real.txt", b"data")
            .add_symlink("link", "/etc/passwd")
            .build();
        let temp = TempDir::new().unwrap();

        let report = extract(data, &temp).unwrap();

        assert_eq!(report.files_extracted, 1);
        assert_eq!(report.members_skipped, 1);
        assert!(report.has_warnings());
        assert!(std::fs::symlink_metadata(temp.path().join("link")).is_err());
    }

    #[test]
    fn test_not_gzip_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let result = extract(b"<html>not an archive</html>".to_vec(), &temp);
        assert!(matches!(result, Err(FetchError::CorruptArchive { .. })));
    }

    #[test]
    fn test_truncated_stream_is_corrupt() {
        let payload = vec![0xA5u8; 256 * 1024];
        let mut data = TarGzBuilder::new().add_file("big.bin", &payload).build();
        data.truncate(data.len() / 2);
        let temp = TempDir::new().unwrap();

        let result = extract(data, &temp);
        assert!(matches!(result, Err(FetchError::CorruptArchive { .. })));
    }

    #[test]
    fn test_root_directory_member_is_noop() {
        let data = TarGzBuilder::new()
            .add_directory("./")
            .add_file("./a.txt", b"a")
            .build();
        let temp = TempDir::new().unwrap();

        let report = extract(data, &temp).unwrap();
        assert_eq!(report.directories_created, 0);
        assert_eq!(report.files_extracted, 1);
    }

    #[test]
    fn test_progress_callbacks() {
        let data = TarGzBuilder::new()
            .add_directory("d/")
            .add_file("d/one.txt", b"12345")
            .add_file("d/two.txt", b"678")
            .build();
        let temp = TempDir::new().unwrap();
        let dest = DestDir::new(temp.path()).unwrap();
        let mut recorder = Recorder::default();

        ArchiveStreamExtractor::default()
            .extract(Cursor::new(data), &dest, &mut recorder)
            .unwrap();

        assert_eq!(
            recorder.started,
            vec![
                PathBuf::from("d"),
                PathBuf::from("d/one.txt"),
                PathBuf::from("d/two.txt")
            ]
        );
        assert_eq!(recorder.completed, 3);
        assert_eq!(recorder.bytes, 8);
        assert!(recorder.finished);
    }

    #[test]
    fn test_existing_file_not_overwritten_by_default() {
        let data = TarGzBuilder::new().add_file("a.txt", b"new").build();
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "old").unwrap();

        let result = extract(data, &temp);
        assert!(matches!(result, Err(FetchError::WriteFailure { .. })));
        assert_eq!(
            std::fs::read_to_string(temp.path().join("a.txt")).unwrap(),
            "old"
        );
    }
}
