/*!
 * ManifestWriter: emits the MHL XML manifest and the flat xxHash.txt summary
 * into a destination root after the tree walk completes.
 */

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::writer::Writer;
use quick_xml::Reader;

use super::types::FileInfo;
use super::user_info;
use crate::error::{CopyError, Result};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn format_iso(when: DateTime<Utc>) -> String {
    when.format(ISO_FORMAT).to_string()
}

fn epoch_to_iso(epoch_secs: f64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_secs as i64, 0)
        .map(format_iso)
        .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string())
}

fn write_text_elem(writer: &mut Writer<Cursor<&mut Vec<u8>>>, name: &str, text: &str) -> Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))
        .map_err(|e| CopyError::Other(format!("failed writing <{name}>: {e}")))?;
    Ok(())
}

/// Write `<dest_root_basename>_YYYY-MM-DD_HHMMSS.mhl` into `dest_root`, one
/// `<hash>` element per `FileInfo`, and return the path written.
pub fn write_mhl(
    dest_root: &Path,
    files: &[FileInfo],
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> Result<PathBuf> {
    let basename = dest_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "destination".to_string());
    let filename = format!("{}_{}.mhl", basename, finished_at.format("%Y-%m-%d_%H%M%S"));
    let path = dest_root.join(&filename);

    let mut buf = Vec::new();
    {
        let mut writer = Writer::new_with_indent(Cursor::new(&mut buf), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| CopyError::Other(format!("failed writing xml declaration: {e}")))?;

        writer
            .create_element("hashlist")
            .with_attribute(("version", "1.1"))
            .write_inner_content(|writer| {
                writer
                    .create_element("creatorinfo")
                    .write_inner_content(|writer| {
                        write_text_elem(writer, "name", &user_info::display_name())
                            .map_err(to_xml_err)?;
                        write_text_elem(writer, "username", &user_info::username())
                            .map_err(to_xml_err)?;
                        write_text_elem(writer, "hostname", &user_info::hostname())
                            .map_err(to_xml_err)?;
                        write_text_elem(writer, "tool", "o/COPY").map_err(to_xml_err)?;
                        write_text_elem(writer, "startdate", &format_iso(started_at))
                            .map_err(to_xml_err)?;
                        write_text_elem(writer, "finishdate", &format_iso(finished_at))
                            .map_err(to_xml_err)?;
                        Ok(())
                    })?;

                for file in files {
                    writer.create_element("hash").write_inner_content(|writer| {
                        let posix_path = file.relative_path.to_string_lossy().replace('\\', "/");
                        write_text_elem(writer, "file", &posix_path).map_err(to_xml_err)?;
                        write_text_elem(writer, "size", &file.size.to_string())
                            .map_err(to_xml_err)?;
                        write_text_elem(writer, "xxhash64be", &file.hash).map_err(to_xml_err)?;
                        write_text_elem(
                            writer,
                            "lastmodificationdate",
                            &epoch_to_iso(file.mtime),
                        )
                        .map_err(to_xml_err)?;
                        write_text_elem(writer, "hashdate", &format_iso(Utc::now()))
                            .map_err(to_xml_err)?;
                        Ok(())
                    })?;
                }

                Ok(())
            })
            .map_err(|e: std::io::Error| CopyError::Other(format!("failed writing mhl body: {e}")))?;
    }

    std::fs::write(&path, buf)?;
    Ok(path)
}

/// quick_xml's `write_inner_content` closures must return `std::io::Result`;
/// our own element writes already produced a `CopyError`, so fold it back
/// into an opaque io error the outer call can unwrap with the real message.
fn to_xml_err(e: CopyError) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

/// Write `xxHash.txt`: one `<hex> <source_basename>` line per file, in the
/// order given.
pub fn write_xxhash_summary(dest_root: &Path, files: &[FileInfo]) -> Result<PathBuf> {
    let path = dest_root.join("xxHash.txt");
    let mut content = String::new();
    for file in files {
        let basename = file
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        content.push_str(&file.hash);
        content.push(' ');
        content.push_str(&basename);
        content.push('\n');
    }
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Find the most recently written `*.mhl` file directly inside `dir`, if any.
pub fn find_existing_mhl(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "mhl").unwrap_or(false))
        .max_by_key(|p| p.file_name().map(|n| n.to_os_string()))
}

/// Parse `mhl_path` looking for a `<hash>` entry whose `<file>` equals
/// `relative_path`, returning its recorded `<xxhash64be>` if found.
pub fn find_hash_in_mhl(mhl_path: &Path, relative_path: &Path) -> Option<String> {
    let file = File::open(mhl_path).ok()?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.config_mut().trim_text(true);

    let target = relative_path.to_string_lossy().replace('\\', "/");
    let mut buf = Vec::new();
    let mut current_tag: Option<String> = None;
    let mut current_file: Option<String> = None;
    let mut current_hash: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "hash" {
                    current_file = None;
                    current_hash = None;
                }
                current_tag = Some(name);
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().unwrap_or_default().into_owned();
                match current_tag.as_deref() {
                    Some("file") => current_file = Some(text),
                    Some("xxhash64be") => current_hash = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"hash" {
                    if current_file.as_deref() == Some(target.as_str()) {
                        return current_hash;
                    }
                }
                current_tag = None;
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn file_info(rel: &str, hash: &str, size: u64) -> FileInfo {
        FileInfo {
            source: PathBuf::from("/src").join(rel),
            relative_path: PathBuf::from(rel),
            hash: hash.to_string(),
            size,
            mtime: 1_700_000_000.0,
        }
    }

    #[test]
    fn write_mhl_and_read_hash_back() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            file_info("A001XXXX/clip1.mov", "aaaaaaaaaaaaaaaa", 100),
            file_info("A001XXXX/clip2.mov", "bbbbbbbbbbbbbbbb", 200),
        ];
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let finish = DateTime::<Utc>::from_timestamp(1_700_000_010, 0).unwrap();

        let path = write_mhl(dir.path(), &files, start, finish).unwrap();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().ends_with(".mhl"));

        let recovered = find_hash_in_mhl(&path, Path::new("A001XXXX/clip2.mov"));
        assert_eq!(recovered.as_deref(), Some("bbbbbbbbbbbbbbbb"));

        let missing = find_hash_in_mhl(&path, Path::new("does/not/exist.mov"));
        assert_eq!(missing, None);
    }

    #[test]
    fn write_xxhash_summary_one_line_per_file() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            file_info("a.mov", "1111111111111111", 1),
            file_info("b.mov", "2222222222222222", 2),
        ];
        let path = write_xxhash_summary(dir.path(), &files).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1111111111111111 a.mov\n2222222222222222 b.mov\n");
    }

    #[test]
    fn empty_file_list_still_writes_valid_artifacts() {
        let dir = TempDir::new().unwrap();
        let start = Utc::now();
        let mhl = write_mhl(dir.path(), &[], start, start).unwrap();
        let xxhash = write_xxhash_summary(dir.path(), &[]).unwrap();

        assert!(std::fs::read_to_string(&mhl).unwrap().contains("creatorinfo"));
        assert_eq!(std::fs::read_to_string(&xxhash).unwrap(), "");
    }

    #[test]
    fn find_existing_mhl_picks_most_recent_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("dst_2024-01-01_000000.mhl"), "").unwrap();
        std::fs::write(dir.path().join("dst_2024-06-01_000000.mhl"), "").unwrap();
        let found = find_existing_mhl(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "dst_2024-06-01_000000.mhl");
    }
}
