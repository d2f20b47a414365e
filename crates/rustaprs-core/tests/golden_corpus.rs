use chrono::{DateTime, TimeZone, Utc};
use rustaprs_core::Packet;
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .expect("workspace root should be resolvable")
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
}

fn fixture_files(dir: &str, ext: &str) -> Vec<PathBuf> {
    let fixture_dir = workspace_root().join(dir);
    let mut files = fs::read_dir(&fixture_dir)
        .expect("fixtures directory should exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect::<Vec<_>>();
    files.sort();
    assert!(
        !files.is_empty(),
        "expected at least one fixture in {}",
        fixture_dir.display()
    );
    files
}

/// Returns the TNC2 line from the leading `# ` comment and the frame bytes.
fn parse_hex_fixture(path: &Path) -> (String, Vec<u8>) {
    let content = fs::read_to_string(path).expect("fixture must be readable");
    let mut line = None;
    let mut out = Vec::new();
    for row in content.lines() {
        let trimmed = row.trim();
        if let Some(comment) = trimmed.strip_prefix("# ") {
            line.get_or_insert_with(|| comment.to_string());
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        for token in trimmed.split_whitespace() {
            let byte = u8::from_str_radix(token, 16)
                .unwrap_or_else(|_| panic!("invalid hex token '{token}' in {}", path.display()));
            out.push(byte);
        }
    }
    let line = line.unwrap_or_else(|| panic!("{} has no TNC2 comment", path.display()));
    (line, out)
}

fn assert_cursor_invariant(packet: &Packet, origin: &str) {
    let payload = packet.payload();
    assert!(
        payload.cursor() <= payload.raw().len(),
        "{origin}: cursor {} past payload of {} bytes",
        payload.cursor(),
        payload.raw().len()
    );
    assert_eq!(
        payload.comment(),
        String::from_utf8_lossy(&payload.raw()[payload.cursor()..]),
        "{origin}: comment is not the unconsumed tail"
    );
}

#[test]
fn golden_frames_match_tnc2_lines() {
    for fixture in fixture_files("fixtures/golden", "hex") {
        let (line, bytes) = parse_hex_fixture(&fixture);
        let origin = fixture.display().to_string();

        let from_text = Packet::parse_at(&line, now())
            .unwrap_or_else(|e| panic!("{origin}: TNC2 parse failed: {e}"));
        assert_eq!(
            from_text.to_ax25_frame().unwrap(),
            bytes,
            "{origin}: encoded frame differs"
        );

        let from_frame = Packet::from_ax25_at(&bytes, now())
            .unwrap_or_else(|e| panic!("{origin}: frame decode failed: {e}"));
        assert_eq!(from_frame.to_string(), line, "{origin}");
        assert_eq!(from_frame.payload(), from_text.payload(), "{origin}");
        assert!(!from_frame.has_fault(), "{origin}: {}", from_frame.fault_reason());
        assert_cursor_invariant(&from_frame, &origin);
    }
}

#[test]
fn corpus_lines_frame_and_keep_cursor_invariant() {
    for fixture in fixture_files("fixtures/corpus", "txt") {
        let content = fs::read_to_string(&fixture).expect("fixture must be readable");
        for (number, line) in content.lines().enumerate() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let origin = format!("{}:{}", fixture.display(), number + 1);
            let packet = Packet::parse_at(line, now())
                .unwrap_or_else(|e| panic!("{origin}: {e}"));
            assert_cursor_invariant(&packet, &origin);
            assert_eq!(packet.to_string(), line, "{origin}");
            assert_eq!(Packet::parse_at(line, now()).unwrap(), packet, "{origin}");
        }
    }
}
