//! Integration tests for gs-raster.
//!
//! Most tests run against a recording executor, so they need neither
//! Ghostscript nor a real document. Live tests that spawn the real `gs`
//! are gated behind the `E2E_ENABLED` environment variable.
//!
//! Run the live tests with:
//!   E2E_ENABLED=1 cargo test --test render -- --nocapture

use gs_raster::{
    AntiAliasing, CommandExecutor, Device, ExecOutput, GsError, Jpeg, NoSniffer, RenderCommand,
    RenderOptions, RenderRequest,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Records every command it is asked to run and answers with a fixed
/// outcome.
struct RecordingExecutor {
    outcome: Outcome,
    calls: Mutex<Vec<(PathBuf, RenderCommand)>>,
}

#[derive(Clone, Copy)]
enum Outcome {
    Exit(Option<i32>),
    SpawnFails,
}

impl RecordingExecutor {
    fn exiting(code: i32) -> Arc<Self> {
        Self::with(Outcome::Exit(Some(code)))
    }

    fn with(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(PathBuf, RenderCommand)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, program: &Path, command: &RenderCommand) -> io::Result<ExecOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_path_buf(), command.clone()));
        match self.outcome {
            Outcome::Exit(code) => Ok(ExecOutput {
                exit_code: code,
                stdout: String::new(),
                stderr: if code == Some(0) {
                    String::new()
                } else {
                    "Error: /syntaxerror in --token--".to_string()
                },
            }),
            Outcome::SpawnFails => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }
}

const GS: &str = "/opt/ghostscript/bin/gs";

fn request_with(executor: Arc<RecordingExecutor>) -> RenderRequest {
    RenderRequest::with_tool(GS).with_executor(executor)
}

/// Write `bytes` to `name` inside a fresh temp dir.
fn input_file(name: &str, bytes: &[u8]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write input");
    (dir, path)
}

const TINY_PS: &[u8] =
    b"%!PS-Adobe-3.0\n/Helvetica findfont 24 scalefont setfont\n72 700 moveto (gs-raster) show\nshowpage\n";

// ── Input validation ─────────────────────────────────────────────────────────

#[test]
fn accepts_pdf_ps_and_eps() {
    let cases: [(&str, &[u8]); 4] = [
        ("doc.pdf", b"%PDF-1.7\n"),
        ("doc.ps", TINY_PS),
        ("fig.eps", b"%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 0 0 10 10\n"),
        ("bin.eps", &[0xC5, 0xD0, 0xD3, 0xC6, 0, 0, 0, 0]),
    ];
    for (name, bytes) in cases {
        let (_dir, path) = input_file(name, bytes);
        let mut gs = request_with(RecordingExecutor::exiting(0));
        gs.set_input_file(&path)
            .unwrap_or_else(|e| panic!("{name} should be accepted: {e}"));
        assert_eq!(gs.input_file(), Some(path.as_path()));
    }
}

#[test]
fn rejects_unsupported_type_and_keeps_previous_input() {
    let (_d1, pdf) = input_file("good.pdf", b"%PDF-1.4\n");
    let (_d2, png) = input_file("image.png", b"\x89PNG\r\n\x1a\n");

    let mut gs = request_with(RecordingExecutor::exiting(0));
    gs.set_input_file(&pdf).unwrap();

    match gs.set_input_file(&png) {
        Err(GsError::UnsupportedInput { path, mime }) => {
            assert_eq!(path, png);
            assert_eq!(mime, "application/octet-stream");
        }
        other => panic!("expected UnsupportedInput, got {other:?}"),
    }
    assert_eq!(gs.input_file(), Some(pdf.as_path()));
}

#[test]
fn unreadable_input_is_reported() {
    let mut gs = request_with(RecordingExecutor::exiting(0));
    let err = gs.set_input_file("/no/such/dir/doc.pdf").unwrap_err();
    assert!(matches!(err, GsError::InputUnreadable { .. }), "got {err:?}");
    assert!(gs.input_file().is_none());
}

#[test]
fn without_detection_any_file_is_accepted() {
    let mut gs = request_with(RecordingExecutor::exiting(0)).with_sniffer(Arc::new(NoSniffer));
    gs.set_input_file("/no/such/dir/picture.png").unwrap();
    assert_eq!(gs.input_file(), Some(Path::new("/no/such/dir/picture.png")));
}

// ── Render string ────────────────────────────────────────────────────────────

#[test]
fn render_string_for_documented_example() {
    let mut gs = request_with(RecordingExecutor::exiting(0)).with_sniffer(Arc::new(NoSniffer));
    gs.set_input_file("/tmp/in/doc.pdf").unwrap();
    gs.set_output_file("result")
        .set_resolution(96, None)
        .set_device_by_name("png")
        .unwrap()
        .set_text_antialiasing(AntiAliasing::High);

    assert_eq!(gs.papersize(), "letter");
    assert_eq!(
        gs.render_string(),
        format!(
            "{GS} -dSAFER -dQUIET -dNOPLATFONTS -dNOPAUSE -dBATCH -sPaperSize=letter \
             -sOutputFile=\"/tmp/in/result.png\" -sDEVICE=png16m -r96 -dTextAlphaBits=4 \
             \"/tmp/in/doc.pdf\""
        )
    );
}

#[test]
fn render_string_is_empty_until_input_is_set() {
    let mut gs = request_with(RecordingExecutor::exiting(0));
    gs.set_device(Jpeg::with_quality(10))
        .set_output_file("/abs/out")
        .set_resolution(1200, Some(600))
        .set_graphics_antialiasing(4);
    assert_eq!(gs.render_string(), "");
    assert_eq!(gs.output_file(), PathBuf::from("/abs/out"));
}

#[test]
fn output_placeholder_and_dots_pass_through() {
    let mut gs = request_with(RecordingExecutor::exiting(0)).with_sniffer(Arc::new(NoSniffer));
    gs.set_input_file("/srv/docs/report.v2.pdf").unwrap();
    gs.set_output_file("report.v2-%03d");
    assert!(gs
        .render_string()
        .contains(r#"-sOutputFile="/srv/docs/report.v2-%03d.png""#));
}

#[test]
fn jpeg_quality_through_device_mut() {
    let mut gs = request_with(RecordingExecutor::exiting(0)).with_sniffer(Arc::new(NoSniffer));
    gs.set_input_file("/d/in.pdf").unwrap();
    gs.set_device_by_name("JPEG").unwrap();
    gs.device_mut()
        .as_jpeg_mut()
        .expect("jpeg device")
        .set_quality(100);

    let s = gs.render_string();
    assert!(
        s.contains(r#"-sOutputFile="/d/output.jpeg" -sDEVICE=jpeg -dJPEGQ=100 -r72"#),
        "got: {s}"
    );
}

#[test]
fn replacing_device_discards_previous_settings() {
    let mut gs = request_with(RecordingExecutor::exiting(0));
    gs.set_device(Jpeg::with_quality(5));
    gs.set_device_by_name("jpeg").unwrap();
    assert_eq!(gs.device(), &Device::Jpeg(Jpeg::default()));
}

#[test]
fn options_file_round_trip_into_request() {
    let options: RenderOptions = serde_json::from_str(
        r#"{
            "output_file": "p%d",
            "resolution": { "horizontal": 96, "vertical": 150 },
            "papersize": "a4",
            "graphics_antialiasing": 2,
            "use_cie": true,
            "device": { "type": "jpeg", "quality": 60 }
        }"#,
    )
    .unwrap();

    let mut gs = request_with(RecordingExecutor::exiting(0))
        .with_sniffer(Arc::new(NoSniffer))
        .with_options(options);
    gs.set_input_file("/in/a.ps").unwrap();

    assert_eq!(
        gs.render_string(),
        format!(
            "{GS} -dSAFER -dQUIET -dNOPLATFONTS -dNOPAUSE -dBATCH -sPaperSize=a4 \
             -sOutputFile=\"/in/p%d.jpeg\" -sDEVICE=jpeg -dJPEGQ=60 -r96x150 \
             -dGraphicsAlphaBits=2 \"/in/a.ps\""
        )
    );
    assert!(gs.use_cie());
    assert!(!gs.render_string().contains("CIE"));
}

// ── Rendering ────────────────────────────────────────────────────────────────

#[test]
fn exit_zero_is_success() {
    let (_dir, path) = input_file("doc.ps", TINY_PS);
    let exec = RecordingExecutor::exiting(0);
    let mut gs = request_with(exec.clone());
    gs.set_input_file(&path).unwrap();

    assert!(gs.render());

    let calls = exec.calls();
    assert_eq!(calls.len(), 1);
    let (program, command) = &calls[0];
    assert_eq!(program, Path::new(GS));
    assert_eq!(command.to_string(), gs.render_string());
    assert_eq!(
        command.argv().last().map(String::as_str),
        path.to_str(),
        "input path goes unquoted into argv"
    );
}

#[test]
fn non_zero_exit_is_failure_not_panic() {
    for code in [1, 2, 255, -1] {
        let (_dir, path) = input_file("doc.ps", TINY_PS);
        let mut gs = request_with(RecordingExecutor::exiting(code));
        gs.set_input_file(&path).unwrap();

        assert!(!gs.render(), "exit {code} must report failure");
        match gs.try_render() {
            Err(GsError::SubprocessFailed { code: c, stderr }) => {
                assert_eq!(c, Some(code));
                assert!(stderr.contains("syntaxerror"));
            }
            other => panic!("expected SubprocessFailed, got {other:?}"),
        }
    }
}

#[test]
fn killed_process_is_failure() {
    let (_dir, path) = input_file("doc.ps", TINY_PS);
    let mut gs = request_with(RecordingExecutor::with(Outcome::Exit(None)));
    gs.set_input_file(&path).unwrap();
    assert!(matches!(
        gs.try_render(),
        Err(GsError::SubprocessFailed { code: None, .. })
    ));
}

#[test]
fn spawn_failure_is_reported() {
    let (_dir, path) = input_file("doc.ps", TINY_PS);
    let mut gs = request_with(RecordingExecutor::with(Outcome::SpawnFails));
    gs.set_input_file(&path).unwrap();
    assert!(!gs.render());
    assert!(matches!(gs.try_render(), Err(GsError::Spawn { .. })));
}

#[test]
fn nothing_runs_without_input() {
    let exec = RecordingExecutor::exiting(0);
    let gs = request_with(exec.clone());
    assert!(!gs.render());
    assert!(matches!(gs.try_render(), Err(GsError::NoInputFile)));
    assert!(exec.calls().is_empty());
}

#[test]
fn missing_tool_fails_without_running() {
    let (_dir, path) = input_file("doc.pdf", b"%PDF-1.4\n");
    let exec = RecordingExecutor::exiting(0);
    let mut gs = RenderRequest::new().with_executor(exec.clone());
    if gs.tool().is_some() {
        println!("SKIP — Ghostscript is installed on this host");
        return;
    }
    gs.set_input_file(&path).unwrap();

    assert!(matches!(gs.try_render(), Err(GsError::ToolMissing)));
    assert!(!gs.render());
    assert!(exec.calls().is_empty());
    assert!(gs.render_string().starts_with(" -dSAFER"));
}

#[tokio::test]
async fn render_async_matches_sync_outcome() {
    let (_dir, path) = input_file("doc.ps", TINY_PS);

    let ok = RecordingExecutor::exiting(0);
    let mut gs = request_with(ok.clone());
    gs.set_input_file(&path).unwrap();
    assert!(gs.render_async().await.is_ok());
    assert_eq!(ok.calls().len(), 1);

    let mut failing = request_with(RecordingExecutor::exiting(1));
    failing.set_input_file(&path).unwrap();
    assert!(matches!(
        failing.render_async().await,
        Err(GsError::SubprocessFailed { code: Some(1), .. })
    ));
}

// ── Live Ghostscript (E2E_ENABLED) ───────────────────────────────────────────

/// Skip unless E2E_ENABLED is set and Ghostscript can be found.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        match gs_locate::locate() {
            Ok(Some(p)) => p,
            _ => {
                println!("SKIP — Ghostscript not found (set GHOSTSCRIPT_PATH)");
                return;
            }
        }
    }};
}

#[test]
fn test_live_render_png_pages() {
    let gs_path = e2e_skip_unless_ready!();
    let (dir, path) = input_file("hello.ps", TINY_PS);

    let mut gs = RenderRequest::with_tool(gs_path);
    gs.set_input_file(&path)
        .unwrap()
        .set_output_file("page-%d")
        .set_resolution(50, None)
        .set_text_antialiasing(AntiAliasing::High)
        .set_graphics_antialiasing(AntiAliasing::High);

    println!("{}", gs.render_string());
    let out = gs.try_render().expect("ghostscript should succeed");
    println!("stderr: {}", out.stderr);

    let page = dir.path().join("page-1.png");
    let bytes = std::fs::read(&page).expect("page-1.png written");
    assert!(bytes.starts_with(b"\x89PNG"), "not a PNG: {}", page.display());
}

#[test]
fn test_live_render_jpeg() {
    let gs_path = e2e_skip_unless_ready!();
    let (dir, path) = input_file("hello.ps", TINY_PS);

    let mut gs = RenderRequest::with_tool(gs_path);
    gs.set_input_file(&path).unwrap();
    gs.set_device(Jpeg::with_quality(50)).set_resolution(40, None);

    assert!(gs.render());
    let bytes = std::fs::read(dir.path().join("output.jpeg")).expect("output.jpeg written");
    assert!(bytes.starts_with(&[0xFF, 0xD8]), "not a JPEG");
}

#[test]
fn test_live_broken_input_fails() {
    let gs_path = e2e_skip_unless_ready!();
    let (_dir, path) = input_file("broken.ps", b"%!PS\n/undefined_operator_xyz\n");

    let mut gs = RenderRequest::with_tool(gs_path);
    gs.set_input_file(&path).unwrap();
    assert!(!gs.render());
}
